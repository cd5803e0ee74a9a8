//! System monitoring models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    pub name: String,
    pub usage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub usage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInfo {
    pub version: String,
    pub total_memory: u64,
    pub used_memory: u64,
    pub free_memory: u64,
    pub usage: f64,
}

/// Server information snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub cpu: CpuInfo,
    pub memory: UsageInfo,
    pub disk: UsageInfo,
    /// 后端运行时（JVM）内存
    #[serde(rename = "jvm")]
    pub runtime: RuntimeInfo,
}

/// Online session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub browser: String,
    #[serde(default)]
    pub os: String,
    pub login_time: String,
    pub last_access_time: String,
}

/// Dashboard statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub user_count: u64,
    pub role_count: u64,
    pub permission_count: u64,
    pub online_user_count: u64,
    pub today_login_count: u64,
    pub total_login_count: u64,
}

/// Performance time series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceData {
    pub cpu: Vec<f64>,
    pub memory: Vec<f64>,
    pub timestamps: Vec<String>,
}

impl PerformanceData {
    /// 最新一个采样点 (时间, cpu, 内存)
    pub fn latest(&self) -> Option<(&str, f64, f64)> {
        let ts = self.timestamps.last()?;
        let cpu = self.cpu.last()?;
        let mem = self.memory.last()?;
        Some((ts.as_str(), *cpu, *mem))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisInfo {
    pub version: String,
    pub uptime: u64,
    pub connected_clients: u64,
    pub used_memory: u64,
    pub max_memory: u64,
}

/// Cache server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInfo {
    pub redis: RedisInfo,
}
