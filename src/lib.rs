//! RBAC 管理控制台客户端库
//! 会话生命周期、权限树筛选、路由守卫与请求拦截

pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod router;
pub mod session;
pub mod shell;
pub mod storage;
pub mod stores;
pub mod telemetry;
pub mod utils;

pub use app::Console;
pub use error::{ConsoleError, Result};
