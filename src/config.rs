//! 配置系统
//! 从环境变量加载所有配置（前缀 RBAC_）

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 后端 API 根地址，例如 "http://localhost:8080/api"
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 本地持久化目录
    pub dir: PathBuf,
    /// Cookie 存储文件名（令牌）
    pub cookie_file: String,
    /// 本地存储文件名（用户信息与偏好）
    pub local_file: String,
}

impl StorageConfig {
    pub fn cookie_path(&self) -> PathBuf {
        self.dir.join(&self.cookie_file)
    }

    pub fn local_path(&self) -> PathBuf {
        self.dir.join(&self.local_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty, compact
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// 应用标题，拼接在页面标题之后
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub app: UiConfig,
}

/// 默认持久化目录
fn default_storage_dir() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("rbac-console")
        .to_string_lossy()
        .into_owned()
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("api.base_url", "http://localhost:8080/api")?
            .set_default("api.timeout_secs", 30)?
            .set_default("storage.dir", default_storage_dir())?
            .set_default("storage.cookie_file", "cookies.json")?
            .set_default("storage.local_file", "local.json")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "compact")?
            .set_default("app.title", "RBAC管理系统")?;

        // 从环境变量加载配置（前缀为 RBAC_）
        settings = settings.add_source(
            Environment::with_prefix("RBAC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Message(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "api.base_url must use http or https, got {}",
                base.scheme()
            )));
        }

        if self.api.timeout_secs == 0 || self.api.timeout_secs > 300 {
            return Err(ConfigError::Message(
                "api.timeout_secs must be between 1 and 300".to_string(),
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty, compact",
                    self.logging.format
                )))
            }
        }

        if self.storage.cookie_file == self.storage.local_file {
            return Err(ConfigError::Message(
                "storage.cookie_file and storage.local_file must differ".to_string(),
            ));
        }

        Ok(())
    }
}
