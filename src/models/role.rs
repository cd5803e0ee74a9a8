//! Role domain models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::Status;

/// 超级管理员角色编码，绕过所有权限检查
pub const SUPER_ADMIN: &str = "SUPER_ADMIN";

/// Role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub role_name: String,
    pub role_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

/// Role list query
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub current: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl RoleQuery {
    pub fn page(current: u64, size: u64) -> Self {
        Self {
            current,
            size,
            ..Default::default()
        }
    }
}

/// Create / update role form
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 30, message = "role name must be 1-30 characters"))]
    pub role_name: String,
    #[validate(regex(path = *crate::utils::validate::CODE_RE, message = "role code must be upper snake case"))]
    pub role_code: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

/// Role usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStats {
    pub user_count: u64,
    pub permission_count: u64,
    #[serde(default)]
    pub last_assign_time: Option<String>,
}
