//! 会话生命周期集成测试

use rbac_console::error::ErrorKind;
use rbac_console::session::{REFRESH_TOKEN_KEY, TOKEN_KEY, USER_INFO_KEY};
use rbac_console::storage::KeyValueStore;

mod common;
use common::{login, login_request, setup, NoticeKind, ACCESS_TOKEN, PASSWORD, USERNAME};

#[tokio::test]
async fn test_login_establishes_session() {
    let t = setup().await;

    let response = t
        .console
        .session_store()
        .login(&login_request(USERNAME, PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.user.username, USERNAME);

    let session = t.console.session();
    assert!(session.is_logged_in());
    assert_eq!(session.access_token().as_deref(), Some(ACCESS_TOKEN));
    assert_eq!(session.profile().unwrap().id, 1);
    assert!(session.has_permission("system:role:list"));
    assert!(session.permissions_loaded());
    assert!(!session.routes_generated());

    // 令牌写入 cookie 存储，用户信息写入本地存储
    assert_eq!(t.cookies.get(TOKEN_KEY).as_deref(), Some(ACCESS_TOKEN));
    assert!(t.cookies.contains(REFRESH_TOKEN_KEY));
    assert!(t.local.contains(USER_INFO_KEY));

    assert_eq!(
        t.notifier.notices(),
        vec![(NoticeKind::Success, "Login successful".to_string())]
    );
}

#[tokio::test]
async fn test_login_rejected_leaves_session_empty() {
    let t = setup().await;

    let err = t
        .console
        .session_store()
        .login(&login_request(USERNAME, "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.user_message(), "用户名或密码错误");

    assert!(!t.console.session().is_logged_in());
    assert!(t.cookies.is_empty());
    assert!(t.local.get(USER_INFO_KEY).is_none());
}

#[tokio::test]
async fn test_login_form_validated_before_request() {
    let t = setup().await;

    let err = t
        .console
        .session_store()
        .login(&login_request("", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(t.state().count("/auth/login"), 0);
}

#[tokio::test]
async fn test_clear_user_data_resets_everything() {
    let t = setup().await;
    login(&t).await;
    t.console.navigate("/dashboard").await.unwrap();
    assert!(t.console.permission_store().has_routes());

    t.console.session_store().clear_user_data();

    let session = t.console.session();
    assert!(!session.is_logged_in());
    assert!(session.access_token().is_none());
    assert!(session.refresh_token().is_none());
    assert!(session.profile().is_none());
    assert!(session.permissions().is_empty());
    assert!(!session.routes_generated());
    assert!(t.console.permission_store().menu_tree().is_empty());
    assert!(t.console.permission_store().routes().is_empty());

    assert!(t.cookies.get(TOKEN_KEY).is_none());
    assert!(t.cookies.get(REFRESH_TOKEN_KEY).is_none());
    assert!(t.local.get(USER_INFO_KEY).is_none());
}

#[tokio::test]
async fn test_refresh_without_token_makes_no_call() {
    let t = setup().await;

    let err = t.console.session_store().refresh_access_token().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(t.state().count("/auth/refresh"), 0);
    assert!(!t.console.session().is_logged_in());
}

#[tokio::test]
async fn test_refresh_replaces_token_pair() {
    let t = setup().await;
    login(&t).await;

    let token = t.console.session_store().refresh_access_token().await.unwrap();
    assert_eq!(token, "access-2");
    assert_eq!(t.console.session().refresh_token().as_deref(), Some("refresh-2"));
    assert_eq!(t.cookies.get(TOKEN_KEY).as_deref(), Some("access-2"));
    // 刷新不影响用户信息
    assert!(t.console.session().profile().is_some());
}

#[tokio::test]
async fn test_logout_notifies_backend_and_clears() {
    let t = setup().await;
    login(&t).await;

    t.console.logout().await;

    let calls = t.state().requests_to("/auth/logout");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer access-1"));
    assert!(!t.console.session().is_logged_in());
    assert!(t.cookies.is_empty());
}

#[tokio::test]
async fn test_logout_without_session_skips_backend() {
    let t = setup().await;

    t.console.logout().await;

    assert_eq!(t.state().count("/auth/logout"), 0);
}

#[tokio::test]
async fn test_restart_restores_tokens_and_profile() {
    let t = setup().await;
    login(&t).await;

    let t = t.restart();
    let session = t.console.session();
    assert!(session.is_logged_in());
    assert_eq!(session.profile().unwrap().username, USERNAME);
    // 权限不落盘，重启后需要重新拉取
    assert!(!session.permissions_loaded());

    t.console.navigate("/dashboard").await.unwrap();
    assert_eq!(t.state().count("/auth/user/info"), 1);
    assert_eq!(t.state().count("/auth/user/permissions"), 1);
    assert!(t.console.session().has_permission("dashboard"));
}

#[tokio::test]
async fn test_change_password_logs_out() {
    use rbac_console::models::auth::ChangePasswordRequest;

    let t = setup().await;
    login(&t).await;

    let request = ChangePasswordRequest {
        old_password: PASSWORD.to_string(),
        new_password: "new-secret".to_string(),
        confirm_password: "new-secret".to_string(),
    };
    t.console.session_store().change_password(&request).await.unwrap();

    assert_eq!(t.state().count("/auth/user/change-password"), 1);
    assert_eq!(t.state().count("/auth/logout"), 1);
    assert!(!t.console.session().is_logged_in());
}
