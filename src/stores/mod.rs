//! 状态仓库
//! 会话、权限与界面偏好；由 [`Console`](crate::app::Console) 创建并注入

mod permission;
mod preferences;
mod session;

pub use permission::{filter_tree, transform_to_menu_tree, PermissionStore};
pub use preferences::{Device, PreferenceStore, Tab};
pub use session::SessionStore;
