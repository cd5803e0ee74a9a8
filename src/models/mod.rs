//! 数据模型模块
//! 与后端 REST 契约一一对应的请求/响应类型

pub mod auth;
pub mod common;
pub mod log;
pub mod permission;
pub mod role;
pub mod system;
pub mod user;

pub use common::{ApiResponse, Download, PageQuery, PageResponse, Status, UploadFile};
pub use permission::{Breadcrumb, MenuNode, PermissionKind, PermissionNode};
pub use role::{Role, SUPER_ADMIN};
pub use user::User;
