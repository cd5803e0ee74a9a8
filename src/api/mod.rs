//! 后端 REST 接口封装
//! 每个模块对应一组资源，所有请求都经过 [`ApiClient`](crate::client::ApiClient)

mod auth;
mod log;
mod permission;
mod role;
mod system;
mod user;

pub use auth::AuthApi;
pub use log::LogApi;
pub use permission::PermissionApi;
pub use role::RoleApi;
pub use system::SystemApi;
pub use user::UserApi;

use serde::Serialize;

use crate::models::common::join_ids;
use crate::models::Status;

/// 唯一性检查参数，`excludeId` 用于编辑时排除自身
pub(crate) fn unique_check(field: &'static str, value: &str, exclude_id: Option<i64>) -> Vec<(&'static str, String)> {
    let mut params = vec![(field, value.to_string())];
    if let Some(id) = exclude_id {
        params.push(("excludeId", id.to_string()));
    }
    params
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusBody {
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdsQuery {
    pub ids: String,
}

impl IdsQuery {
    pub fn new(ids: &[i64]) -> Self {
        Self { ids: join_ids(ids) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_check_params() {
        assert_eq!(unique_check("username", "alice", None), vec![("username", "alice".to_string())]);
        assert_eq!(
            unique_check("roleCode", "ADMIN", Some(3)),
            vec![("roleCode", "ADMIN".to_string()), ("excludeId", "3".to_string())]
        );
    }

    #[test]
    fn test_status_body_wire_format() {
        let body = serde_json::to_value(StatusBody { status: Status::Disabled }).unwrap();
        assert_eq!(body, serde_json::json!({"status": 0}));
        assert_eq!(IdsQuery::new(&[1, 2]).ids, "1,2");
    }
}
