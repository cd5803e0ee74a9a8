use serde::Serialize;
use validator::Validate;

use super::{unique_check, IdsQuery, StatusBody};
use crate::client::ApiClient;
use crate::error::{ConsoleError, Result};
use crate::models::user::{UserForm, UserQuery};
use crate::models::{Download, PageResponse, Status, UploadFile, User};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody<'a> {
    new_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignRolesBody<'a> {
    role_ids: &'a [i64],
}

/// 用户管理接口
#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn page(&self, query: &UserQuery) -> Result<PageResponse<User>> {
        self.client.get_with("/system/users", query).await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        self.client.get(&format!("/system/users/{}", id)).await
    }

    pub async fn create(&self, form: &UserForm) -> Result<User> {
        form.validate()?;
        if form.password.is_none() {
            return Err(ConsoleError::validation("password is required for a new user"));
        }
        self.client.post("/system/users", form).await
    }

    pub async fn update(&self, id: i64, form: &UserForm) -> Result<User> {
        form.validate()?;
        self.client.put(&format!("/system/users/{}", id), form).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/system/users/{}", id)).await
    }

    pub async fn batch_delete(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Err(ConsoleError::validation("no users selected"));
        }
        self.client
            .delete_with("/system/users/batch", &IdsQuery::new(ids))
            .await
    }

    pub async fn set_status(&self, id: i64, status: Status) -> Result<()> {
        self.client
            .put(&format!("/system/users/{}/status", id), &StatusBody { status })
            .await
    }

    pub async fn reset_password(&self, id: i64, new_password: &str) -> Result<()> {
        if new_password.chars().count() < 6 {
            return Err(ConsoleError::validation("password must be at least 6 characters"));
        }
        self.client
            .put(
                &format!("/system/users/{}/reset-password", id),
                &ResetPasswordBody { new_password },
            )
            .await
    }

    pub async fn assign_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()> {
        self.client
            .post(&format!("/system/users/{}/roles", user_id), &AssignRolesBody { role_ids })
            .await
    }

    pub async fn roles(&self, user_id: i64) -> Result<Vec<i64>> {
        self.client.get(&format!("/system/users/{}/roles", user_id)).await
    }

    pub async fn export(&self, query: &UserQuery) -> Result<Download> {
        self.client
            .download("/system/users/export", query, "用户数据.xlsx")
            .await
    }

    pub async fn import(&self, file: UploadFile) -> Result<()> {
        self.client.upload("/system/users/import", file).await
    }

    pub async fn check_username(&self, username: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with("/system/users/check-username", &unique_check("username", username, exclude_id))
            .await
    }

    pub async fn check_email(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with("/system/users/check-email", &unique_check("email", email, exclude_id))
            .await
    }

    pub async fn check_phone(&self, phone: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.client
            .get_with("/system/users/check-phone", &unique_check("phone", phone, exclude_id))
            .await
    }
}
