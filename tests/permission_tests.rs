//! 权限树与菜单集成测试

use rbac_console::models::MenuNode;
use rbac_console::stores::PermissionStore;
use std::sync::atomic::Ordering;

mod common;
use common::{login, setup};

/// 逐层校验菜单标题可按路径查回，返回校验过的节点数
fn assert_titles_resolve(store: &PermissionStore, menus: &[MenuNode]) -> usize {
    let mut checked = 0;
    for menu in menus {
        if !menu.path.is_empty() {
            assert_eq!(store.get_menu_title(&menu.path), menu.title, "path {}", menu.path);
            checked += 1;
        }
        checked += assert_titles_resolve(store, &menu.children);
    }
    checked
}

#[tokio::test]
async fn test_generate_routes_filters_by_grants() {
    let t = setup().await;
    login(&t).await;

    let routes = t.console.permission_store().generate_routes().await.unwrap();
    let codes: Vec<_> = routes.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["dashboard", "system"]);

    // 未授权的父节点因为保留了子节点而保留
    let system = &routes[1];
    assert_eq!(system.children.len(), 1);
    assert_eq!(system.children[0].code, "system:role:list");
}

#[tokio::test]
async fn test_granted_child_of_granted_parent_alone() {
    let t = setup().await;
    t.state().set_permissions(&["system:user:list"]);
    login(&t).await;

    let routes = t.console.permission_store().generate_routes().await.unwrap();
    let users = &routes[0].children[0];
    assert_eq!(users.code, "system:user:list");
    // 按钮节点未授权，被剔除
    assert!(users.children.is_empty());
}

#[tokio::test]
async fn test_super_admin_keeps_whole_tree() {
    let t = setup().await;
    t.state().super_admin.store(true, Ordering::SeqCst);
    t.state().set_permissions(&[]);
    login(&t).await;

    let routes = t.console.permission_store().generate_routes().await.unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[1].children.len(), 2);
    assert!(t.console.permission_store().has_button_permission("system:user:add"));
}

#[tokio::test]
async fn test_menu_title_and_breadcrumbs() {
    let t = setup().await;
    login(&t).await;
    t.console.permission_store().generate_routes().await.unwrap();

    let store = t.console.permission_store();
    assert!(assert_titles_resolve(store, &store.menu_tree()) >= 3);
    assert_eq!(store.get_menu_title("/system/roles"), "角色管理");
    assert_eq!(store.get_menu_title("/system/users"), "");

    let crumbs = store.get_breadcrumbs("/system/roles");
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[0].path.as_deref(), Some("/system"));
    assert!(crumbs[1].path.is_none());
    assert!(store.get_breadcrumbs("/nope").is_empty());
}

#[tokio::test]
async fn test_menu_titles_resolve_across_whole_tree() {
    let t = setup().await;
    t.state().super_admin.store(true, Ordering::SeqCst);
    t.state().set_permissions(&[]);
    login(&t).await;
    t.console.permission_store().generate_routes().await.unwrap();

    let store = t.console.permission_store();
    let menus = store.menu_tree();
    let nested = menus.iter().map(|m| m.children.len()).sum::<usize>();
    assert!(nested >= 2);
    assert!(assert_titles_resolve(store, &menus) >= menus.len() + 2);
    assert_eq!(store.get_menu_title("/system/users"), "用户管理");
}

#[tokio::test]
async fn test_button_permissions_cached() {
    let t = setup().await;
    login(&t).await;

    let codes = t.console.permission_store().get_button_permissions(Some(3)).await.unwrap();
    assert_eq!(codes, vec!["system:user:add"]);
    assert_eq!(t.console.permission_store().button_permissions(), codes);

    let request = &t.state().requests_to("/system/permissions/buttons")[0];
    assert_eq!(request.query.get("menuId").map(String::as_str), Some("3"));

    // 按钮权限判断基于会话权限集合
    assert!(!t.console.permission_store().has_button_permission("system:user:add"));
}

#[tokio::test]
async fn test_cache_hidden_after_session_change() {
    let t = setup().await;
    login(&t).await;
    t.console.permission_store().generate_routes().await.unwrap();
    assert!(t.console.permission_store().has_routes());

    // 会话被替换后旧缓存不可见
    t.console.session().clear();
    assert!(!t.console.permission_store().has_routes());
    assert!(t.console.permission_store().menu_tree().is_empty());
    assert_eq!(t.console.permission_store().get_menu_title("/system/roles"), "");
}
