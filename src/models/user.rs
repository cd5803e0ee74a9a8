//! User domain models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::Status;
use super::role::Role;

/// User account as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    /// 是否拥有指定角色编码
    pub fn has_role(&self, role_code: &str) -> bool {
        self.roles.iter().any(|r| r.role_code == role_code)
    }

    /// 展示名：昵称优先
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.username
        } else {
            &self.nickname
        }
    }
}

/// User list query
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub current: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl UserQuery {
    pub fn page(current: u64, size: u64) -> Self {
        Self {
            current,
            size,
            ..Default::default()
        }
    }
}

/// Create / update user form
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[validate(length(min = 3, max = 20, message = "username must be 3-20 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 30, message = "nickname must be 1-30 characters"))]
    pub nickname: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(regex(path = *crate::utils::validate::PHONE_RE, message = "invalid phone number"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, max = 128, message = "password must be 6-128 characters"))]
    pub password: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}
