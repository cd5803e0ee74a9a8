//! 界面外壳接口
//! 提示消息、确认框、全局进度与导航请求，由前端实现

use crate::router::Location;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 用户可见的瞬时提示与确认框
#[async_trait]
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);

    /// 弹出确认框，返回用户是否确认
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// 只写日志的提示器
pub struct LogNotifier {
    confirm_answer: bool,
}

impl LogNotifier {
    pub fn new(confirm_answer: bool) -> Self {
        Self { confirm_answer }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notice = "success", "{}", message);
    }

    fn warning(&self, message: &str) {
        tracing::warn!(notice = "warning", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(notice = "error", "{}", message);
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        tracing::info!(title = %title, answer = self.confirm_answer, "{}", message);
        self.confirm_answer
    }
}

/// 导航请求的接收方（通常是路由）
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Location);
}

/// 把导航请求转发到通道，由应用主循环消费
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Location>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Location>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, to: Location) {
        if self.tx.send(to).is_err() {
            tracing::debug!("Navigation receiver dropped");
        }
    }
}

/// 全局进度指示
///
/// `start()` 返回的守卫在析构时结束本次进度，所以任何返回路径都不会遗留"进行中"状态
#[derive(Clone, Default)]
pub struct ProgressTracker {
    in_flight: Arc<AtomicUsize>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> ProgressGuard {
        let before = self.in_flight.fetch_add(1, Ordering::SeqCst);
        if before == 0 {
            tracing::trace!("Progress started");
        }
        ProgressGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_active(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

pub struct ProgressGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            tracing::trace!("Progress done");
        }
    }
}
