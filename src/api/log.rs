use super::IdsQuery;
use crate::client::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::models::log::{LogStatistics, LoginLog, LoginLogQuery, OperationLog, OperationLogQuery};
use crate::models::{Download, PageResponse};

/// 审计日志接口
#[derive(Clone)]
pub struct LogApi {
    client: ApiClient,
}

impl LogApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn operation_logs(&self, query: &OperationLogQuery) -> Result<PageResponse<OperationLog>> {
        self.client.get_with("/system/logs/operation", query).await
    }

    pub async fn login_logs(&self, query: &LoginLogQuery) -> Result<PageResponse<LoginLog>> {
        self.client.get_with("/system/logs/login", query).await
    }

    pub async fn delete_operation_log(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/system/logs/operation/{}", id)).await
    }

    pub async fn batch_delete_operation_logs(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Err(ConsoleError::validation("no logs selected"));
        }
        self.client
            .delete_with("/system/logs/operation/batch", &IdsQuery::new(ids))
            .await
    }

    pub async fn clear_operation_logs(&self) -> Result<()> {
        self.client.delete("/system/logs/operation/clear").await
    }

    pub async fn delete_login_log(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/system/logs/login/{}", id)).await
    }

    pub async fn batch_delete_login_logs(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Err(ConsoleError::validation("no logs selected"));
        }
        self.client
            .delete_with("/system/logs/login/batch", &IdsQuery::new(ids))
            .await
    }

    pub async fn clear_login_logs(&self) -> Result<()> {
        self.client.delete("/system/logs/login/clear").await
    }

    pub async fn export_operation_logs(&self, query: &OperationLogQuery) -> Result<Download> {
        self.client
            .download("/system/logs/operation/export", query, "操作日志.xlsx")
            .await
    }

    pub async fn export_login_logs(&self, query: &LoginLogQuery) -> Result<Download> {
        self.client
            .download("/system/logs/login/export", query, "登录日志.xlsx")
            .await
    }

    pub async fn statistics(&self) -> Result<LogStatistics> {
        self.client.get("/system/logs/statistics").await
    }
}
