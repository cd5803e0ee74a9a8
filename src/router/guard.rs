//! 路由守卫
//! 每次导航先经过守卫：未登录只放行白名单，首次进入受保护页面时加载用户信息并注册动态路由

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::location::Location;
use super::route::{async_routes, filter_routes, LOGIN_PATH, NOT_FOUND_PATH, ROOT_PATH, WHITELIST};
use super::table::{ResolvedRoute, RouteTable};
use crate::error::{ConsoleError, ErrorKind, Result};
use crate::session::Session;
use crate::shell::Notifier;
use crate::stores::{PermissionStore, SessionStore};

/// 单次导航允许的最大重定向次数
pub const MAX_REDIRECTS: usize = 16;

pub const BOOTSTRAP_FAILED_NOTICE: &str = "Failed to load user information, please log in again";
pub const ACCESS_DENIED_NOTICE: &str = "You do not have permission to access this page";

/// 守卫对一次导航的裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Location),
    /// 动态路由刚注册完成，重新匹配同一目标
    Retry,
}

/// 完成的导航
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub location: Location,
    pub route: ResolvedRoute,
    pub title: String,
    /// 到达前依次经过的路径（不含最终路径）
    pub redirects: Vec<String>,
}

pub struct Router {
    table: RwLock<RouteTable>,
    session: Arc<Session>,
    session_store: Arc<SessionStore>,
    permission_store: Arc<PermissionStore>,
    notifier: Arc<dyn Notifier>,
    app_title: String,
    generation: AtomicU64,
    cancel: Mutex<CancellationToken>,
    current: RwLock<Option<Navigation>>,
    document_title: RwLock<String>,
}

impl Router {
    pub fn new(
        session_store: Arc<SessionStore>,
        permission_store: Arc<PermissionStore>,
        notifier: Arc<dyn Notifier>,
        app_title: impl Into<String>,
    ) -> Self {
        let app_title = app_title.into();
        Self {
            table: RwLock::new(RouteTable::new()),
            session: Arc::clone(session_store.session()),
            session_store,
            permission_store,
            notifier,
            document_title: RwLock::new(app_title.clone()),
            app_title,
            generation: AtomicU64::new(0),
            cancel: Mutex::new(CancellationToken::new()),
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<Navigation> {
        self.current.read().clone()
    }

    pub fn document_title(&self) -> String {
        self.document_title.read().clone()
    }

    /// 当前已注册路由的完整路径
    pub fn route_paths(&self) -> Vec<String> {
        self.table.read().paths()
    }

    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        self.table.read().resolve(path)
    }

    /// 回到只有基础路由的状态（退出登录后调用）
    pub fn reset(&self) {
        self.cancel.lock().cancel();
        self.table.write().clear_dynamic();
        *self.current.write() = None;
        *self.document_title.write() = self.app_title.clone();
    }

    /// 开始新一代导航并取消上一代
    fn begin_navigation(&self) -> (u64, CancellationToken) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = std::mem::replace(&mut *self.cancel.lock(), token.clone());
        previous.cancel();
        (generation, token)
    }

    fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(ConsoleError::Superseded)
        }
    }

    /// 导航到目标，返回最终到达的页面
    ///
    /// 被更新的导航取代时返回 `Superseded`，且不再修改共享状态
    pub async fn push(&self, to: impl Into<Location>) -> Result<Navigation> {
        let (generation, token) = self.begin_navigation();
        let mut target: Location = to.into();
        let mut redirects = Vec::new();

        loop {
            self.ensure_current(generation)?;
            self.table.write().retain_epoch(self.session.epoch());

            let resolved = self.table.read().resolve(&target.path);

            // 路由记录自身的重定向先于守卫生效
            if let Some(redirect) = resolved.as_ref().and_then(|r| r.redirect.clone()) {
                target = self.redirect_to(&target, Location::parse(&redirect), &mut redirects)?;
                continue;
            }

            match self.guard(&target, resolved.as_ref(), generation, &token).await? {
                GuardDecision::Proceed => {
                    let route = resolved.ok_or_else(|| {
                        ConsoleError::Navigation(format!("No route matches {}", target.path))
                    })?;
                    return self.commit(generation, target, route, redirects);
                }
                GuardDecision::Redirect(next) => {
                    target = self.redirect_to(&target, next, &mut redirects)?;
                }
                GuardDecision::Retry => {
                    debug!(path = %target.path, "Re-dispatching after route registration");
                }
            }
        }
    }

    fn redirect_to(&self, from: &Location, next: Location, redirects: &mut Vec<String>) -> Result<Location> {
        redirects.push(from.full_path());
        if redirects.len() > MAX_REDIRECTS {
            return Err(ConsoleError::Navigation(format!(
                "Too many redirects while navigating to {}",
                next.path
            )));
        }
        Ok(next)
    }

    fn commit(
        &self,
        generation: u64,
        location: Location,
        route: ResolvedRoute,
        redirects: Vec<String>,
    ) -> Result<Navigation> {
        self.ensure_current(generation)?;

        let title = if route.meta.title.is_empty() {
            self.app_title.clone()
        } else {
            format!("{} - {}", route.meta.title, self.app_title)
        };

        let navigation = Navigation {
            location,
            route,
            title: title.clone(),
            redirects,
        };
        *self.document_title.write() = title;
        *self.current.write() = Some(navigation.clone());

        debug!(path = %navigation.location, "Navigation complete");
        Ok(navigation)
    }

    /// 守卫状态机
    async fn guard(
        &self,
        target: &Location,
        resolved: Option<&ResolvedRoute>,
        generation: u64,
        token: &CancellationToken,
    ) -> Result<GuardDecision> {
        // 未登录
        if !self.session.is_logged_in() {
            if WHITELIST.contains(&target.path.as_str()) {
                return Ok(GuardDecision::Proceed);
            }
            return Ok(GuardDecision::Redirect(login_redirect(&target.path)));
        }

        // 已登录用户不能再进入登录页
        if target.path == LOGIN_PATH {
            return Ok(GuardDecision::Redirect(Location::new(ROOT_PATH)));
        }

        if !self.session.routes_generated() {
            return match self.bootstrap(generation, token).await {
                Ok(()) => Ok(GuardDecision::Retry),
                Err(ConsoleError::Superseded) => Err(ConsoleError::Superseded),
                Err(e) => {
                    self.ensure_current(generation)?;
                    warn!(error = %e, path = %target.path, "Session bootstrap failed");
                    if self.session.is_logged_in() {
                        self.session_store.logout().await;
                    } else {
                        self.session_store.clear_user_data();
                    }
                    self.notifier.error(BOOTSTRAP_FAILED_NOTICE);
                    Ok(GuardDecision::Redirect(login_redirect(&target.path)))
                }
            };
        }

        let Some(route) = resolved else {
            return Ok(GuardDecision::Redirect(Location::new(NOT_FOUND_PATH)));
        };

        // 无权限按 404 处理，不暴露路由是否存在
        if self.session.is_super_admin() || route.meta.allows(&self.session.permissions()) {
            Ok(GuardDecision::Proceed)
        } else {
            info!(path = %target.path, "Route access denied");
            self.notifier.error(ACCESS_DENIED_NOTICE);
            Ok(GuardDecision::Redirect(Location::new(NOT_FOUND_PATH)))
        }
    }

    /// 加载用户信息、生成权限树并注册动态路由
    async fn bootstrap(&self, generation: u64, token: &CancellationToken) -> Result<()> {
        let epoch = self.session.epoch();

        let work = async {
            if self.session.profile().is_none() || !self.session.permissions_loaded() {
                self.session_store.get_user_info().await?;
            }
            self.permission_store.generate_routes().await?;
            Ok::<(), ConsoleError>(())
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(generation, "Bootstrap cancelled by a newer navigation");
                return Err(ConsoleError::Superseded);
            }
            result = work => result.map_err(|e| {
                // 会话在本代导航仍有效时被替换，按失败处理
                if is_superseded(&e) && self.ensure_current(generation).is_ok() {
                    ConsoleError::auth("Session changed during bootstrap")
                } else {
                    e
                }
            })?,
        }

        self.ensure_current(generation)?;

        let routes = if self.session.is_super_admin() {
            async_routes()
        } else {
            filter_routes(&async_routes(), &self.session.permissions())
        };

        // 会话在加载期间被清空或替换
        if self.session.epoch() != epoch {
            return Err(ConsoleError::auth("Session changed during bootstrap"));
        }

        self.table.write().replace_dynamic(routes, epoch);
        if !self.session.mark_routes_generated(epoch) {
            self.table.write().clear_dynamic();
            return Err(ConsoleError::auth("Session is not ready for route generation"));
        }

        info!(epoch, routes = self.table.read().dynamic_routes().len(), "Dynamic routes registered");
        Ok(())
    }
}

fn login_redirect(path: &str) -> Location {
    Location::new(LOGIN_PATH).with_query("redirect", path)
}

/// 导航失败是否只是被新的导航取代
pub fn is_superseded(error: &ConsoleError) -> bool {
    error.kind() == ErrorKind::Superseded
}
