use serde::Serialize;
use validator::Validate;

use super::{unique_check, IdsQuery, StatusBody};
use crate::client::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::models::role::{RoleForm, RoleQuery, RoleStats};
use crate::models::{PageResponse, Role, Status};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignPermissionsBody<'a> {
    permission_ids: &'a [i64],
}

/// 角色管理接口
#[derive(Clone)]
pub struct RoleApi {
    client: ApiClient,
}

impl RoleApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn page(&self, query: &RoleQuery) -> Result<PageResponse<Role>> {
        self.client.get_with("/system/roles", query).await
    }

    pub async fn all(&self) -> Result<Vec<Role>> {
        self.client.get("/system/roles/all").await
    }

    pub async fn get(&self, id: i64) -> Result<Role> {
        self.client.get(&format!("/system/roles/{}", id)).await
    }

    pub async fn create(&self, form: &RoleForm) -> Result<Role> {
        form.validate()?;
        self.client.post("/system/roles", form).await
    }

    pub async fn update(&self, id: i64, form: &RoleForm) -> Result<Role> {
        form.validate()?;
        self.client.put(&format!("/system/roles/{}", id), form).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/system/roles/{}", id)).await
    }

    pub async fn batch_delete(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Err(ConsoleError::validation("no roles selected"));
        }
        self.client
            .delete_with("/system/roles/batch", &IdsQuery::new(ids))
            .await
    }

    pub async fn set_status(&self, id: i64, status: Status) -> Result<()> {
        self.client
            .put(&format!("/system/roles/{}/status", id), &StatusBody { status })
            .await
    }

    pub async fn assign_permissions(&self, role_id: i64, permission_ids: &[i64]) -> Result<()> {
        self.client
            .post(
                &format!("/system/roles/{}/permissions", role_id),
                &AssignPermissionsBody { permission_ids },
            )
            .await
    }

    pub async fn permissions(&self, role_id: i64) -> Result<Vec<i64>> {
        self.client
            .get(&format!("/system/roles/{}/permissions", role_id))
            .await
    }

    pub async fn check_name(&self, role_name: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with("/system/roles/check-name", &unique_check("roleName", role_name, exclude_id))
            .await
    }

    pub async fn check_code(&self, role_code: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with("/system/roles/check-code", &unique_check("roleCode", role_code, exclude_id))
            .await
    }

    pub async fn stats(&self, role_id: i64) -> Result<RoleStats> {
        self.client.get(&format!("/system/roles/{}/stats", role_id)).await
    }
}
