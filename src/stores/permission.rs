//! 权限树、菜单树与按钮权限缓存

use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::api::PermissionApi;
use crate::error::{ConsoleError, Result};
use crate::models::{Breadcrumb, MenuNode, PermissionNode};
use crate::session::Session;

/// 按已授权编码筛选权限树
///
/// 节点自身被授权或至少保留了一个后代时保留；返回新树，不修改输入
pub fn filter_tree(nodes: &[PermissionNode], granted: &HashSet<String>) -> Vec<PermissionNode> {
    nodes
        .iter()
        .filter_map(|node| {
            let children = filter_tree(&node.children, granted);
            if !granted.contains(&node.code) && children.is_empty() {
                return None;
            }
            Some(PermissionNode {
                id: node.id,
                name: node.name.clone(),
                code: node.code.clone(),
                kind: node.kind,
                parent_id: node.parent_id,
                route_path: node.route_path.clone(),
                component_ref: node.component_ref.clone(),
                icon: node.icon.clone(),
                sort_order: node.sort_order,
                enabled: node.enabled,
                children,
            })
        })
        .collect()
}

/// 权限树到菜单树的结构投影，停用的节点标记为隐藏
pub fn transform_to_menu_tree(nodes: &[PermissionNode]) -> Vec<MenuNode> {
    nodes
        .iter()
        .map(|node| MenuNode {
            id: node.id,
            title: node.name.clone(),
            path: node.route_path.clone().unwrap_or_default(),
            component: node.component_ref.clone(),
            icon: node.icon.clone(),
            sort: node.sort_order,
            hidden: !node.enabled,
            children: transform_to_menu_tree(&node.children),
        })
        .collect()
}

fn find_chain<'a>(menus: &'a [MenuNode], path: &str, chain: &mut Vec<&'a MenuNode>) -> bool {
    for menu in menus {
        chain.push(menu);
        if menu.path == path || find_chain(&menu.children, path, chain) {
            return true;
        }
        chain.pop();
    }
    false
}

#[derive(Default)]
struct PermissionCache {
    /// 缓存所属的会话 epoch
    epoch: Option<u64>,
    routes: Vec<PermissionNode>,
    menu_tree: Vec<MenuNode>,
    buttons: Vec<String>,
}

pub struct PermissionStore {
    session: Arc<Session>,
    api: PermissionApi,
    cache: RwLock<PermissionCache>,
}

impl PermissionStore {
    pub fn new(session: Arc<Session>, api: PermissionApi) -> Self {
        Self {
            session,
            api,
            cache: RwLock::new(PermissionCache::default()),
        }
    }

    /// 拉取权限树并按当前会话筛选，结果覆盖缓存
    pub async fn generate_routes(&self) -> Result<Vec<PermissionNode>> {
        let snapshot = self.session.snapshot();
        let tree = self.api.menu_tree().await?;

        let routes = if snapshot.is_super_admin {
            tree
        } else {
            filter_tree(&tree, &snapshot.permissions)
        };
        let menu_tree = transform_to_menu_tree(&routes);

        // 拉取期间会话已被替换，丢弃结果
        if self.session.epoch() != snapshot.epoch {
            return Err(ConsoleError::Superseded);
        }

        let mut cache = self.cache.write();
        if cache.epoch != Some(snapshot.epoch) {
            cache.buttons.clear();
        }
        cache.epoch = Some(snapshot.epoch);
        cache.routes = routes.clone();
        cache.menu_tree = menu_tree;
        debug!(epoch = snapshot.epoch, roots = routes.len(), "Permission routes generated");

        Ok(routes)
    }

    /// 拉取按钮权限编码（可限定菜单）
    pub async fn get_button_permissions(&self, menu_id: Option<i64>) -> Result<Vec<String>> {
        let epoch = self.session.epoch();
        let codes: Vec<String> = self
            .api
            .button_permissions(menu_id)
            .await?
            .into_iter()
            .map(|node| node.code)
            .collect();

        if self.session.epoch() != epoch {
            return Err(ConsoleError::Superseded);
        }

        let mut cache = self.cache.write();
        if cache.epoch != Some(epoch) {
            *cache = PermissionCache {
                epoch: Some(epoch),
                ..Default::default()
            };
        }
        cache.buttons = codes.clone();
        Ok(codes)
    }

    pub fn has_button_permission(&self, code: &str) -> bool {
        self.session.is_super_admin() || self.session.has_permission(code)
    }

    /// 面包屑：祖先链路标题，最后一项不带 path
    pub fn get_breadcrumbs(&self, path: &str) -> Vec<Breadcrumb> {
        self.with_current(Vec::new, |cache| {
            let mut chain = Vec::new();
            if !find_chain(&cache.menu_tree, path, &mut chain) {
                return Vec::new();
            }
            let last = chain.len() - 1;
            chain
                .iter()
                .enumerate()
                .map(|(i, menu)| Breadcrumb {
                    title: menu.title.clone(),
                    path: (i != last).then(|| menu.path.clone()),
                })
                .collect()
        })
    }

    pub fn get_menu_title(&self, path: &str) -> String {
        self.with_current(String::new, |cache| {
            let mut chain = Vec::new();
            if find_chain(&cache.menu_tree, path, &mut chain) {
                chain.last().map(|m| m.title.clone()).unwrap_or_default()
            } else {
                String::new()
            }
        })
    }

    pub fn reset_permissions(&self) {
        *self.cache.write() = PermissionCache::default();
    }

    pub fn routes(&self) -> Vec<PermissionNode> {
        self.with_current(Vec::new, |cache| cache.routes.clone())
    }

    pub fn menu_tree(&self) -> Vec<MenuNode> {
        self.with_current(Vec::new, |cache| cache.menu_tree.clone())
    }

    pub fn button_permissions(&self) -> Vec<String> {
        self.with_current(Vec::new, |cache| cache.buttons.clone())
    }

    pub fn has_routes(&self) -> bool {
        self.with_current(|| false, |cache| !cache.routes.is_empty())
    }

    /// 只读取属于当前会话的缓存
    fn with_current<T>(&self, empty: impl FnOnce() -> T, read: impl FnOnce(&PermissionCache) -> T) -> T {
        let cache = self.cache.read();
        if cache.epoch == Some(self.session.epoch()) {
            read(&cache)
        } else {
            empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PermissionKind;

    fn node(id: i64, code: &str, path: Option<&str>, children: Vec<PermissionNode>) -> PermissionNode {
        PermissionNode {
            id,
            name: format!("title-{}", id),
            code: code.to_string(),
            kind: PermissionKind::Menu,
            parent_id: 0,
            route_path: path.map(str::to_string),
            component_ref: None,
            icon: None,
            sort_order: 0,
            enabled: true,
            children,
        }
    }

    fn granted(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_filter_keeps_granted_parent_drops_child() {
        let tree = vec![node(1, "a.view", None, vec![node(2, "a.edit", None, vec![])])];
        let filtered = filter_tree(&tree, &granted(&["a.view"]));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].code, "a.view");
        assert!(filtered[0].children.is_empty());
        // 源树保持不变
        assert_eq!(tree[0].children.len(), 1);
    }

    #[test]
    fn test_filter_keeps_ungranted_parent_of_granted_child() {
        let tree = vec![node(
            1,
            "system",
            None,
            vec![node(2, "system:user:list", None, vec![]), node(3, "system:role:list", None, vec![])],
        )];
        let filtered = filter_tree(&tree, &granted(&["system:role:list"]));
        assert_eq!(filtered[0].code, "system");
        assert_eq!(filtered[0].children.len(), 1);
        assert_eq!(filtered[0].children[0].code, "system:role:list");
    }

    #[test]
    fn test_filter_drops_everything_without_grants() {
        let tree = vec![node(1, "a", None, vec![node(2, "b", None, vec![])])];
        assert!(filter_tree(&tree, &granted(&[])).is_empty());
    }

    #[test]
    fn test_menu_projection_hides_disabled() {
        let mut disabled = node(2, "b", Some("/b"), vec![]);
        disabled.enabled = false;
        let menu = transform_to_menu_tree(&[node(1, "a", None, vec![disabled])]);
        assert_eq!(menu[0].path, "");
        assert!(!menu[0].hidden);
        assert!(menu[0].children[0].hidden);
        assert_eq!(menu[0].children[0].title, "title-2");
    }

    #[test]
    fn test_find_chain_depth_first() {
        let menu = transform_to_menu_tree(&[node(
            1,
            "system",
            Some("/system"),
            vec![node(2, "users", Some("/system/users"), vec![])],
        )]);
        let mut chain = Vec::new();
        assert!(find_chain(&menu, "/system/users", &mut chain));
        assert_eq!(chain.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);

        let mut missing = Vec::new();
        assert!(!find_chain(&menu, "/nope", &mut missing));
        assert!(missing.is_empty());
    }
}
