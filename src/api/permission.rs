use serde::Serialize;
use validator::Validate;

use super::{unique_check, StatusBody};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::permission::{PermissionForm, PermissionQuery};
use crate::models::{PermissionNode, Status};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ButtonQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    menu_id: Option<i64>,
}

/// 权限管理接口
#[derive(Clone)]
pub struct PermissionApi {
    client: ApiClient,
}

impl PermissionApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn tree(&self, query: &PermissionQuery) -> Result<Vec<PermissionNode>> {
        self.client.get_with("/system/permissions/tree", query).await
    }

    /// 平铺列表
    pub async fn list(&self, query: &PermissionQuery) -> Result<Vec<PermissionNode>> {
        self.client.get_with("/system/permissions", query).await
    }

    pub async fn get(&self, id: i64) -> Result<PermissionNode> {
        self.client.get(&format!("/system/permissions/{}", id)).await
    }

    pub async fn create(&self, form: &PermissionForm) -> Result<PermissionNode> {
        form.validate()?;
        self.client.post("/system/permissions", form).await
    }

    pub async fn update(&self, id: i64, form: &PermissionForm) -> Result<PermissionNode> {
        form.validate()?;
        self.client.put(&format!("/system/permissions/{}", id), form).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/system/permissions/{}", id)).await
    }

    pub async fn set_status(&self, id: i64, status: Status) -> Result<()> {
        self.client
            .put(&format!("/system/permissions/{}/status", id), &StatusBody { status })
            .await
    }

    pub async fn check_name(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with(
                "/system/permissions/check-name",
                &unique_check("permissionName", name, exclude_id),
            )
            .await
    }

    pub async fn check_code(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with(
                "/system/permissions/check-code",
                &unique_check("permissionCode", code, exclude_id),
            )
            .await
    }

    /// 当前用户可见的菜单树（未经客户端过滤）
    pub async fn menu_tree(&self) -> Result<Vec<PermissionNode>> {
        self.client.get("/system/permissions/tree").await
    }

    pub async fn button_permissions(&self, menu_id: Option<i64>) -> Result<Vec<PermissionNode>> {
        self.client
            .get_with("/system/permissions/buttons", &ButtonQuery { menu_id })
            .await
    }
}
