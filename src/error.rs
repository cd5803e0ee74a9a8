//! 统一错误模型
//! 定义客户端所有错误类型及其用户提示

use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// 传输层失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// 后端返回了非 2xx 状态码且没有可用的响应信封
    Status(u16),
    /// 请求超时
    Timeout,
    /// 无法建立连接
    Connect,
    /// 响应体无法解析
    Decode,
    /// 其他请求构造或发送错误
    Request,
}

/// 错误大类，对应会话处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Permission,
    Validation,
    Business,
    Transport,
    Storage,
    Config,
    Navigation,
    Superseded,
}

/// 控制台错误类型
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request failed ({code}): {message}")]
    Business { code: i64, message: String },

    #[error("Transport error: {message}")]
    Transport { kind: TransportKind, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Navigation superseded")]
    Superseded,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConsoleError {
    /// 获取错误大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Auth(_) => ErrorKind::Auth,
            ConsoleError::Permission(_) => ErrorKind::Permission,
            ConsoleError::Validation(_) => ErrorKind::Validation,
            ConsoleError::Business { .. } => ErrorKind::Business,
            ConsoleError::Transport { .. } | ConsoleError::Serialization(_) => {
                ErrorKind::Transport
            }
            ConsoleError::Storage(_) => ErrorKind::Storage,
            ConsoleError::Config(_) => ErrorKind::Config,
            ConsoleError::Navigation(_) => ErrorKind::Navigation,
            ConsoleError::Superseded => ErrorKind::Superseded,
        }
    }

    /// 获取数字错误码（HTTP 语义）
    pub fn code(&self) -> u16 {
        match self {
            ConsoleError::Auth(_) => 401,
            ConsoleError::Permission(_) => 403,
            ConsoleError::Validation(_) => 400,
            ConsoleError::Business { code, .. } => u16::try_from(*code).unwrap_or(500),
            ConsoleError::Transport { kind: TransportKind::Status(status), .. } => *status,
            ConsoleError::Transport { kind: TransportKind::Timeout, .. } => 408,
            ConsoleError::Transport { .. } | ConsoleError::Serialization(_) => 503,
            ConsoleError::Storage(_) | ConsoleError::Config(_) => 500,
            ConsoleError::Navigation(_) => 404,
            ConsoleError::Superseded => 499,
        }
    }

    /// 获取用户友好的错误消息（不包含内部细节）
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Auth(msg)
            | ConsoleError::Permission(msg)
            | ConsoleError::Validation(msg) => msg.clone(),
            ConsoleError::Business { message, .. } => message.clone(),
            ConsoleError::Transport { message, .. } => message.clone(),
            ConsoleError::Storage(_) => "Local storage error".to_string(),
            ConsoleError::Config(_) => "Configuration error".to_string(),
            ConsoleError::Navigation(msg) => msg.clone(),
            ConsoleError::Superseded => "Navigation was superseded".to_string(),
            ConsoleError::Serialization(_) => "Unexpected response format".to_string(),
        }
    }

    /// 该错误是否要求清空会话
    pub fn clears_session(&self) -> bool {
        matches!(self.kind(), ErrorKind::Auth)
    }

    // 便捷方法
    pub fn auth(msg: impl Into<String>) -> Self {
        ConsoleError::Auth(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        ConsoleError::Permission(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ConsoleError::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        ConsoleError::Storage(msg.into())
    }

    pub fn transport(kind: TransportKind, msg: impl Into<String>) -> Self {
        ConsoleError::Transport { kind, message: msg.into() }
    }
}

impl From<config::ConfigError> for ConsoleError {
    fn from(e: config::ConfigError) -> Self {
        ConsoleError::Config(e.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Storage(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ConsoleError {
    fn from(e: validator::ValidationErrors) -> Self {
        ConsoleError::Validation(e.to_string())
    }
}
