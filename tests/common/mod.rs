//! 测试公共模块
//! 提供模拟后端、记录提示的 Notifier 和控制台构造辅助函数

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use parking_lot::Mutex;
use rbac_console::config::{ApiConfig, AppConfig, LoggingConfig, StorageConfig, UiConfig};
use rbac_console::models::auth::LoginRequest;
use rbac_console::shell::Notifier;
use rbac_console::storage::MemoryStore;
use rbac_console::Console;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const CAPTCHA: &str = "1234";
pub const CAPTCHA_KEY: &str = "captcha-key-1";
pub const ACCESS_TOKEN: &str = "access-1";
/// 携带该令牌时用户信息接口返回 401 信封
pub const EXPIRED_TOKEN: &str = "expired-token";
const EXPIRED_AUTHORIZATION: &str = "Bearer expired-token";
/// 携带该令牌时用户信息接口返回 500
pub const BROKEN_TOKEN: &str = "broken-token";
const BROKEN_AUTHORIZATION: &str = "Bearer broken-token";
pub const REFRESH_TOKEN: &str = "refresh-1";

/// 模拟后端收到的请求
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub trace_id: Option<String>,
}

/// 模拟后端的可变状态
pub struct MockState {
    pub requests: Mutex<Vec<RecordedRequest>>,
    /// 登录与权限接口返回的权限编码
    pub permissions: Mutex<Vec<String>>,
    pub super_admin: AtomicBool,
    /// 权限树接口的响应延迟（毫秒）
    pub tree_delay_ms: AtomicU64,
    pub tree_fails: AtomicBool,
}

impl MockState {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            permissions: Mutex::new(default_permissions()),
            super_admin: AtomicBool::new(false),
            tree_delay_ms: AtomicU64::new(0),
            tree_fails: AtomicBool::new(false),
        }
    }

    pub fn set_permissions(&self, codes: &[&str]) {
        *self.permissions.lock() = codes.iter().map(|c| c.to_string()).collect();
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        let full = format!("/api{}", path);
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == full)
            .cloned()
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

pub fn default_permissions() -> Vec<String> {
    vec!["dashboard".to_string(), "system:role:list".to_string()]
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

/// 在随机端口启动模拟后端
pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::new());
    let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Failed to read mock backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    MockBackend {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

/// 一个没有服务监听的地址
pub async fn closed_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{}/api", addr)
}

fn ok(data: Value) -> Response {
    Json(json!({ "code": 200, "message": "success", "data": data, "timestamp": 0 })).into_response()
}

fn envelope(code: i64, message: &str) -> Response {
    Json(json!({ "code": code, "message": message, "data": null, "timestamp": 0 })).into_response()
}

fn user_json(state: &MockState) -> Value {
    let role = if state.super_admin.load(Ordering::SeqCst) {
        json!({ "id": 1, "roleName": "超级管理员", "roleCode": "SUPER_ADMIN", "status": 1 })
    } else {
        json!({ "id": 2, "roleName": "管理员", "roleCode": "ADMIN", "status": 1 })
    };
    json!({
        "id": 1,
        "username": USERNAME,
        "nickname": "管理员",
        "email": "admin@example.com",
        "phone": "13800138000",
        "status": 1,
        "roles": [role]
    })
}

fn permission_tree() -> Value {
    json!([
        {
            "id": 1, "permissionName": "仪表板", "permissionCode": "dashboard", "type": 1,
            "parentId": 0, "path": "/dashboard", "component": "Dashboard", "sort": 1, "status": 1
        },
        {
            "id": 2, "permissionName": "系统管理", "permissionCode": "system", "type": 1,
            "parentId": 0, "path": "/system", "component": "Layout", "sort": 2, "status": 1,
            "children": [
                {
                    "id": 3, "permissionName": "用户管理", "permissionCode": "system:user:list", "type": 1,
                    "parentId": 2, "path": "/system/users", "component": "system/Users", "sort": 1, "status": 1,
                    "children": [
                        {
                            "id": 5, "permissionName": "新增用户", "permissionCode": "system:user:add",
                            "type": 2, "parentId": 3, "sort": 1, "status": 1
                        }
                    ]
                },
                {
                    "id": 4, "permissionName": "角色管理", "permissionCode": "system:role:list", "type": 1,
                    "parentId": 2, "path": "/system/roles", "component": "system/Roles", "sort": 2, "status": 1
                }
            ]
        }
    ])
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query: HashMap<String, String> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    let authorization = header_value(header::AUTHORIZATION.as_str());
    state.requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query,
        authorization: authorization.clone(),
        trace_id: header_value("x-trace-id"),
    });

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path());

    match (method.as_str(), path) {
        ("GET", "/auth/captcha") => ok(json!({
            "captchaKey": CAPTCHA_KEY,
            "captchaImage": "data:image/png;base64,iVBORw0KGgo="
        })),
        ("POST", "/auth/login") => {
            if body["captcha"] != CAPTCHA {
                return envelope(400, "验证码错误");
            }
            if body["username"] != USERNAME || body["password"] != PASSWORD {
                return envelope(500, "用户名或密码错误");
            }
            let permissions = state.permissions.lock().clone();
            ok(json!({
                "token": ACCESS_TOKEN,
                "refreshToken": REFRESH_TOKEN,
                "user": user_json(&state),
                "permissions": permissions
            }))
        }
        ("POST", "/auth/logout") => ok(Value::Null),
        ("POST", "/auth/user/change-password") => ok(Value::Null),
        ("POST", "/auth/refresh") => {
            if body["refreshToken"] == REFRESH_TOKEN {
                ok(json!({ "token": "access-2", "refreshToken": "refresh-2" }))
            } else {
                envelope(401, "刷新令牌无效")
            }
        }
        ("GET", "/auth/user/info") => {
            if authorization.as_deref() == Some(EXPIRED_AUTHORIZATION) {
                return envelope(401, "登录已过期");
            }
            if authorization.as_deref() == Some(BROKEN_AUTHORIZATION) {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            ok(user_json(&state))
        }
        ("GET", "/auth/user/permissions") => ok(json!(state.permissions.lock().clone())),
        ("GET", "/system/permissions/tree") => {
            let delay = state.tree_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if state.tree_fails.load(Ordering::SeqCst) {
                return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
            }
            ok(permission_tree())
        }
        ("GET", "/system/permissions/buttons") => ok(json!([
            {
                "id": 5, "permissionName": "新增用户", "permissionCode": "system:user:add",
                "type": 2, "parentId": 3, "sort": 1, "status": 1
            }
        ])),
        ("GET", "/system/users") => ok(json!({
            "records": [user_json(&state)],
            "total": 1, "size": 10, "current": 1, "pages": 1
        })),
        ("GET", "/system/users/export") => (
            [
                (header::CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"users-2024.xlsx\""),
            ],
            vec![0x50u8, 0x4b, 0x03, 0x04],
        )
            .into_response(),
        ("GET", "/probe/forbidden") => envelope(403, "无权限"),
        ("GET", "/probe/expired") => envelope(401, "登录已过期"),
        ("GET", "/probe/business") => envelope(1001, "角色编码已存在"),
        ("GET", "/probe/http-400") => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": 400, "message": "username is required", "data": null })),
        )
            .into_response(),
        ("GET", "/probe/http-401") => StatusCode::UNAUTHORIZED.into_response(),
        ("GET", "/probe/http-500") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ("GET", "/probe/slow") => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            ok(Value::Null)
        }
        ("GET", "/probe/not-json") => "plain text".into_response(),
        (_, "/probe/echo") => ok(json!({ "ok": true })),
        ("GET", "/check/null-data") => ok(Value::Null),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// 记录所有提示的 Notifier，确认框固定返回 `confirm_answer`
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
    confirm_answer: AtomicBool,
    confirms: AtomicUsize,
    confirm_delay_ms: AtomicU64,
}

impl RecordingNotifier {
    pub fn new(confirm_answer: bool) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(confirm_answer),
            confirms: AtomicUsize::new(0),
            confirm_delay_ms: AtomicU64::new(0),
        }
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|(kind, _)| *kind == NoticeKind::Error)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }

    pub fn confirms(&self) -> usize {
        self.confirms.load(Ordering::SeqCst)
    }

    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    /// 模拟用户迟迟不回应确认框
    pub fn set_confirm_delay(&self, delay: Duration) {
        self.confirm_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices.lock().push((NoticeKind::Success, message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.notices.lock().push((NoticeKind::Warning, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.lock().push((NoticeKind::Error, message.to_string()));
    }

    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        let delay = self.confirm_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

/// 创建测试配置
pub fn create_test_config(base_url: &str) -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        },
        storage: StorageConfig {
            dir: std::env::temp_dir().join("rbac-console-tests"),
            cookie_file: "cookies.json".to_string(),
            local_file: "local.json".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        app: UiConfig {
            title: "RBAC管理系统".to_string(),
        },
    }
}

/// 测试用的控制台及其依赖
pub struct TestConsole {
    pub console: Console,
    pub notifier: Arc<RecordingNotifier>,
    pub cookies: Arc<MemoryStore>,
    pub local: Arc<MemoryStore>,
    pub backend: MockBackend,
}

impl TestConsole {
    pub fn state(&self) -> &MockState {
        &self.backend.state
    }

    /// 使用同一组存储重新创建控制台（模拟重启）
    pub fn restart(self) -> TestConsole {
        let config = create_test_config(&self.backend.base_url);
        let console = Console::with_stores(
            config,
            self.cookies.clone(),
            self.local.clone(),
            self.notifier.clone(),
        )
        .expect("Failed to rebuild console");
        TestConsole { console, ..self }
    }
}

pub async fn setup() -> TestConsole {
    setup_with(true, |_| {}).await
}

/// 可定制确认框答案与配置的控制台
pub async fn setup_with(confirm_answer: bool, tweak: impl FnOnce(&mut AppConfig)) -> TestConsole {
    let backend = spawn_backend().await;
    let mut config = create_test_config(&backend.base_url);
    tweak(&mut config);

    let notifier = Arc::new(RecordingNotifier::new(confirm_answer));
    let cookies = Arc::new(MemoryStore::new());
    let local = Arc::new(MemoryStore::new());
    let console = Console::with_stores(config, cookies.clone(), local.clone(), notifier.clone())
        .expect("Failed to create console");

    TestConsole {
        console,
        notifier,
        cookies,
        local,
        backend,
    }
}

pub fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
        captcha: CAPTCHA.to_string(),
        captcha_key: CAPTCHA_KEY.to_string(),
        remember_me: None,
    }
}

/// 以默认账号登录并清空提示记录
pub async fn login(t: &TestConsole) {
    t.console
        .session_store()
        .login(&login_request(USERNAME, PASSWORD))
        .await
        .expect("Login failed");
    t.notifier.clear();
}
