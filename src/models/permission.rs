//! Permission tree and derived menu models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::{default_true, status_flag, Status};

/// 权限节点类型（后端以 1/2 表示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum PermissionKind {
    Menu,
    Button,
}

impl TryFrom<i64> for PermissionKind {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PermissionKind::Menu),
            2 => Ok(PermissionKind::Button),
            other => Err(format!("invalid permission type: {}", other)),
        }
    }
}

impl From<PermissionKind> for i64 {
    fn from(kind: PermissionKind) -> Self {
        match kind {
            PermissionKind::Menu => 1,
            PermissionKind::Button => 2,
        }
    }
}

/// 后端下发的权限树节点，客户端只读
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNode {
    pub id: i64,
    #[serde(rename = "permissionName")]
    pub name: String,
    #[serde(rename = "permissionCode")]
    pub code: String,
    #[serde(rename = "type")]
    pub kind: PermissionKind,
    #[serde(default)]
    pub parent_id: i64,
    #[serde(rename = "path", default, skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
    #[serde(rename = "component", default, skip_serializing_if = "Option::is_none")]
    pub component_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "sort", default)]
    pub sort_order: i32,
    #[serde(rename = "status", with = "status_flag", default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    pub fn is_menu(&self) -> bool {
        self.kind == PermissionKind::Menu
    }

    /// 深度优先遍历所有节点（含自身）
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a PermissionNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// 展示用菜单节点，由 PermissionNode 单向投影而来
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: i64,
    pub title: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub sort: i32,
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

/// 面包屑条目；最后一项（当前页）不带 path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breadcrumb {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Permission query
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PermissionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PermissionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Create / update permission form
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PermissionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 50, message = "permission name must be 1-50 characters"))]
    pub permission_name: String,
    #[validate(regex(path = *crate::utils::validate::PERMISSION_CODE_RE, message = "permission code must look like module:resource:action"))]
    pub permission_code: String,
    #[serde(rename = "type")]
    pub kind: PermissionKind,
    pub parent_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub sort: i32,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_node_wire_format() {
        let json = r#"{
            "id": 10,
            "permissionName": "用户管理",
            "permissionCode": "system:user:list",
            "type": 1,
            "parentId": 1,
            "path": "/system/users",
            "component": "system/Users",
            "icon": "User",
            "sort": 1,
            "status": 0,
            "children": [
                {"id": 11, "permissionName": "新增", "permissionCode": "system:user:add",
                 "type": 2, "parentId": 10, "sort": 1, "status": 1}
            ]
        }"#;
        let node: PermissionNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.code, "system:user:list");
        assert!(node.is_menu());
        assert!(!node.enabled);
        assert_eq!(node.route_path.as_deref(), Some("/system/users"));
        assert_eq!(node.children[0].kind, PermissionKind::Button);
        assert!(node.children[0].enabled);
        assert!(node.children[0].route_path.is_none());

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["status"], 0);
        assert_eq!(back["type"], 1);
    }

    #[test]
    fn test_permission_node_missing_status_is_enabled() {
        let json = r#"{"id":1,"permissionName":"x","permissionCode":"x","type":1}"#;
        let node: PermissionNode = serde_json::from_str(json).unwrap();
        assert!(node.enabled);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_walk_visits_depth_first() {
        let json = r#"{"id":1,"permissionName":"a","permissionCode":"a","type":1,"children":[
            {"id":2,"permissionName":"b","permissionCode":"b","type":1,"children":[
                {"id":3,"permissionName":"c","permissionCode":"c","type":2}]},
            {"id":4,"permissionName":"d","permissionCode":"d","type":1}]}"#;
        let node: PermissionNode = serde_json::from_str(json).unwrap();
        let mut ids = Vec::new();
        node.walk(&mut |n| ids.push(n.id));
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_permission_type_rejected() {
        let json = r#"{"id":1,"permissionName":"x","permissionCode":"x","type":9}"#;
        assert!(serde_json::from_str::<PermissionNode>(json).is_err());
    }
}
