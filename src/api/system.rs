use crate::client::ApiClient;
use crate::error::Result;
use crate::models::system::{CacheInfo, OnlineUser, PerformanceData, Statistics, SystemInfo};
use crate::models::{PageQuery, PageResponse};

/// 系统监控接口
#[derive(Clone)]
pub struct SystemApi {
    client: ApiClient,
}

impl SystemApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn info(&self) -> Result<SystemInfo> {
        self.client.get("/system/monitor/info").await
    }

    pub async fn online_users(&self, page: PageQuery) -> Result<PageResponse<OnlineUser>> {
        self.client.get_with("/system/monitor/online-users", &page).await
    }

    /// 强制下线指定会话
    pub async fn force_logout(&self, token: &str) -> Result<()> {
        let encoded: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
        self.client
            .delete(&format!("/system/monitor/online-users/{}", encoded))
            .await
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        self.client.get("/system/monitor/statistics").await
    }

    pub async fn performance(&self) -> Result<PerformanceData> {
        self.client.get("/system/monitor/performance").await
    }

    pub async fn clear_cache(&self) -> Result<()> {
        self.client.delete("/system/monitor/cache").await
    }

    pub async fn cache_info(&self) -> Result<CacheInfo> {
        self.client.get("/system/monitor/cache/info").await
    }
}
