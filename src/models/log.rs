//! Operation and login audit log models

use serde::{Deserialize, Serialize};

/// Operation log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub operation: String,
    pub method: String,
    #[serde(default)]
    pub params: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub user_agent: String,
    /// 执行耗时（毫秒）
    pub execute_time: u64,
    pub create_time: String,
}

/// Login log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginLog {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub user_agent: String,
    /// 1 成功，0 失败
    pub status: i32,
    #[serde(default)]
    pub message: String,
    pub create_time: String,
}

impl LoginLog {
    pub fn succeeded(&self) -> bool {
        self.status == 1
    }
}

/// Operation log query
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OperationLogQuery {
    pub current: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Login log query
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginLogQuery {
    pub current: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

/// Log statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStatistics {
    pub operation_count: u64,
    pub login_count: u64,
    pub today_operation_count: u64,
    pub today_login_count: u64,
    #[serde(default)]
    pub recent_operations: Vec<DailyCount>,
    #[serde(default)]
    pub recent_logins: Vec<DailyCount>,
}
