//! 后端 API 客户端
//! 统一附加令牌、解析响应信封并把失败转换为一次用户提示

use chrono::Utc;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::{ConsoleError, Result, TransportKind};
use crate::models::common::{CODE_FORBIDDEN, CODE_SUCCESS, CODE_UNAUTHORIZED};
use crate::models::{ApiResponse, Download, UploadFile};
use crate::router::{Location, LOGIN_PATH};
use crate::session::Session;
use crate::shell::{Navigator, Notifier, ProgressTracker};

pub const TRACE_HEADER: &str = "x-trace-id";

pub const SESSION_EXPIRED_TITLE: &str = "System notice";
pub const SESSION_EXPIRED_PROMPT: &str =
    "Your session has expired. You can stay on this page or log in again";
pub const PERMISSION_DENIED_NOTICE: &str = "Insufficient permissions to access this resource";

/// 传输层失败时按状态码给出的提示
pub fn status_message(status: u16, envelope_message: Option<&str>) -> String {
    let envelope_message = envelope_message.filter(|m| !m.trim().is_empty());
    match status {
        400 => envelope_message.unwrap_or("Bad request parameters").to_string(),
        401 => "Unauthorized, please log in again".to_string(),
        403 => "Permission denied, access refused".to_string(),
        404 => "Requested resource does not exist".to_string(),
        500 => "Internal server error".to_string(),
        502 => "Bad gateway".to_string(),
        503 => "Service unavailable".to_string(),
        504 => "Gateway timeout".to_string(),
        other => envelope_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Connection error {}", other)),
    }
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    progress: ProgressTracker,
    /// 同一时刻只弹出一个会话过期确认框
    handling_expired: AtomicBool,
}

/// API 客户端，克隆成本很低
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
    /// 静默模式下失败只写日志，不弹提示也不询问用户
    quiet: bool,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        progress: ProgressTracker,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConsoleError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                session,
                notifier,
                navigator,
                progress,
                handling_expired: AtomicBool::new(false),
            }),
            quiet: false,
        })
    }

    /// 共享同一连接与会话的静默客户端
    pub fn quiet(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            quiet: true,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.inner.progress
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, |req| req).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, |req| req.query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, |req| req.json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::POST, path, |req| req).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, |req| req.json(body)).await
    }

    /// 参数放在查询串中的 PUT
    pub async fn put_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, |req| req.query(query)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::DELETE, path, |req| req).await
    }

    pub async fn delete_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::DELETE, path, |req| req.query(query)).await
    }

    /// 下载二进制内容；`filename` 在响应未给出文件名时使用
    pub async fn download<Q>(&self, path: &str, query: &Q, filename: &str) -> Result<Download>
    where
        Q: Serialize + ?Sized,
    {
        let _progress = self.inner.progress.start();
        let started = Instant::now();

        let outcome = match self.dispatch(Method::GET, path, |req| req.query(query)).await {
            Ok(response) => self.read_download(response, filename).await,
            Err(e) => Err(e),
        };
        self.record(&Method::GET, path, started, &outcome);
        outcome
    }

    /// multipart 上传单个文件（字段名 `file`）
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, file: UploadFile) -> Result<T> {
        let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename);
        let form = reqwest::multipart::Form::new().part("file", part);
        self.send(Method::POST, path, move |req| req.multipart(form)).await
    }

    async fn send<T, F>(&self, method: Method, path: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        // 守卫析构即结束进度，覆盖所有返回路径
        let _progress = self.inner.progress.start();
        let started = Instant::now();

        let outcome = match self.dispatch(method.clone(), path, build).await {
            Ok(response) => self.read_envelope(response).await,
            Err(e) => Err(e),
        };
        self.record(&method, path, started, &outcome);
        outcome
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        };
        url::Url::parse(&joined).map_err(|e| {
            ConsoleError::transport(TransportKind::Request, format!("Invalid request URL {}: {}", joined, e))
        })
    }

    /// 构造并发送请求，传输层失败时提示一次
    async fn dispatch<F>(&self, method: Method, path: &str, build: F) -> Result<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = match self.endpoint(path) {
            Ok(url) => url,
            Err(e) => {
                self.notify_error(&e.user_message());
                return Err(e);
            }
        };

        let mut request = self
            .inner
            .http
            .request(method.clone(), url)
            .header(TRACE_HEADER, Uuid::new_v4().to_string());

        if let Some(token) = self.inner.session.access_token() {
            request = request.bearer_auth(token);
        }

        request = build(request);

        // 只有读请求追加防缓存时间戳
        if method == Method::GET {
            request = request.query(&[("_t", Utc::now().timestamp_millis())]);
        }

        request.send().await.map_err(|e| self.transport_failure(e))
    }

    async fn read_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_failure(e))?;

        if !status.is_success() {
            let envelope = serde_json::from_slice::<ApiResponse<Value>>(&body).ok();
            return Err(self.status_failure(status, envelope.map(|e| e.message)).await);
        }

        let envelope: ApiResponse<Value> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) => return Err(self.decode_failure(e)),
        };

        self.unwrap_envelope(envelope).await
    }

    async fn read_download(&self, response: Response, fallback_name: &str) -> Result<Download> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| fallback_name.to_string());

        let body = response.bytes().await.map_err(|e| self.transport_failure(e))?;

        if !status.is_success() {
            let envelope = serde_json::from_slice::<ApiResponse<Value>>(&body).ok();
            return Err(self.status_failure(status, envelope.map(|e| e.message)).await);
        }

        // 后端以 JSON 信封拒绝导出
        if content_type.as_deref().is_some_and(|ct| ct.starts_with("application/json")) {
            if let Ok(envelope) = serde_json::from_slice::<ApiResponse<Value>>(&body) {
                if !envelope.is_success() {
                    self.unwrap_envelope::<Value>(envelope).await?;
                }
            }
        }

        Ok(Download {
            filename,
            content_type,
            bytes: body.to_vec(),
        })
    }

    async fn unwrap_envelope<T: DeserializeOwned>(&self, envelope: ApiResponse<Value>) -> Result<T> {
        let message = envelope.message.trim().to_string();

        match envelope.code {
            CODE_SUCCESS => {
                let data = envelope.data.unwrap_or(Value::Null);
                let was_null = data.is_null();
                match serde_json::from_value(data) {
                    Ok(value) => Ok(value),
                    // 列表接口以 null 表示空集合
                    Err(_) if was_null => serde_json::from_value(Value::Array(Vec::new()))
                        .map_err(|e| self.decode_failure(e)),
                    Err(e) => Err(self.decode_failure(e)),
                }
            }
            CODE_UNAUTHORIZED => {
                self.handle_expired_session().await;
                Err(ConsoleError::auth(non_empty(message, "Session expired")))
            }
            CODE_FORBIDDEN => {
                self.notify_error(PERMISSION_DENIED_NOTICE);
                Err(ConsoleError::permission(non_empty(message, "Permission denied")))
            }
            400 => {
                let message = non_empty(message, "Request failed");
                self.notify_error(&message);
                Err(ConsoleError::validation(message))
            }
            code => {
                let message = non_empty(message, "Request failed");
                self.notify_error(&message);
                Err(ConsoleError::Business { code, message })
            }
        }
    }

    fn notify_error(&self, message: &str) {
        if self.quiet {
            debug!("Suppressed notice: {}", message);
        } else {
            self.inner.notifier.error(message);
        }
    }

    /// 会话过期：持有令牌时询问用户，提示前先清空会话
    async fn handle_expired_session(&self) {
        if !self.inner.session.is_logged_in() {
            return;
        }
        self.inner.session.clear();
        if self.quiet || self.inner.handling_expired.swap(true, Ordering::SeqCst) {
            return;
        }
        // 请求在提示期间被丢弃时也要复位
        let _prompt = PromptGuard(&self.inner.handling_expired);

        let relogin = self
            .inner
            .notifier
            .confirm(SESSION_EXPIRED_TITLE, SESSION_EXPIRED_PROMPT)
            .await;

        if relogin {
            self.inner.navigator.navigate(Location::new(LOGIN_PATH));
        }
    }

    async fn status_failure(&self, status: StatusCode, envelope_message: Option<String>) -> ConsoleError {
        let code = status.as_u16();
        let message = status_message(code, envelope_message.as_deref());
        self.notify_error(&message);
        warn!(status = code, "Request rejected: {}", message);

        let error = match code {
            400 => ConsoleError::validation(message),
            401 => ConsoleError::auth(message),
            403 => ConsoleError::permission(message),
            _ => ConsoleError::transport(TransportKind::Status(code), message),
        };
        if error.clears_session() {
            self.inner.session.clear();
            self.inner.navigator.navigate(Location::new(LOGIN_PATH));
        }
        error
    }

    fn transport_failure(&self, error: reqwest::Error) -> ConsoleError {
        let (kind, message) = if error.is_timeout() {
            (TransportKind::Timeout, "Request timed out")
        } else if error.is_connect() {
            (TransportKind::Connect, "Network connection error")
        } else if error.is_decode() {
            (TransportKind::Decode, "Unexpected response format")
        } else {
            (TransportKind::Request, "Network error")
        };

        warn!(error = %error, "Request failed: {}", message);
        self.notify_error(message);
        ConsoleError::transport(kind, message)
    }

    fn decode_failure(&self, error: serde_json::Error) -> ConsoleError {
        warn!(error = %error, "Failed to decode response");
        let message = "Unexpected response format";
        self.notify_error(message);
        ConsoleError::transport(TransportKind::Decode, message)
    }

    fn record<T>(&self, method: &Method, path: &str, started: Instant, outcome: &Result<T>) {
        let elapsed = started.elapsed();
        let label = match outcome {
            Ok(_) => "success",
            Err(e) => match e.kind() {
                crate::error::ErrorKind::Auth => "unauthorized",
                crate::error::ErrorKind::Permission => "forbidden",
                crate::error::ErrorKind::Transport => "transport_error",
                _ => "rejected",
            },
        };

        metrics::counter!("console_requests_total", "method" => method.to_string(), "outcome" => label)
            .increment(1);
        metrics::histogram!("console_request_duration_seconds").record(elapsed.as_secs_f64());

        debug!(
            method = %method,
            path = %path,
            outcome = label,
            code = outcome.as_ref().err().map(ConsoleError::code),
            elapsed_ms = elapsed.as_millis() as u64,
            "Request finished"
        );
    }
}

/// 离开作用域时复位过期提示标记
struct PromptGuard<'a>(&'a AtomicBool);

impl Drop for PromptGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// 取出 `Content-Disposition` 中的文件名
fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        if let Some(encoded) = part.strip_prefix("filename*=") {
            let value = encoded.rsplit("''").next()?;
            return url::form_urlencoded::parse(format!("f={}", value).as_bytes())
                .next()
                .map(|(_, v)| v.into_owned());
        }
        part.strip_prefix("filename=")
            .map(|v| v.trim_matches('"').to_string())
    })
    .filter(|name| !name.is_empty())
}
