//! 应用上下文
//! 创建并持有所有仓库、路由与 API 客户端，组件之间通过这里显式注入

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::api::{AuthApi, LogApi, PermissionApi, RoleApi, SystemApi, UserApi};
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::error::Result;
use crate::router::{is_superseded, Location, Navigation, Router, LOGIN_PATH, WHITELIST};
use crate::session::Session;
use crate::shell::{ChannelNavigator, Notifier, ProgressTracker};
use crate::storage::{FileStore, KeyValueStore};
use crate::stores::{PermissionStore, PreferenceStore, SessionStore, Tab};

pub struct Console {
    config: AppConfig,
    session: Arc<Session>,
    client: ApiClient,
    session_store: Arc<SessionStore>,
    permission_store: Arc<PermissionStore>,
    preferences: Arc<PreferenceStore>,
    router: Arc<Router>,
    progress: ProgressTracker,
    navigation_requests: Mutex<UnboundedReceiver<Location>>,
}

impl Console {
    /// 使用配置目录下的文件存储
    pub fn from_config(config: AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let cookies: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.storage.cookie_path())?);
        let local: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.storage.local_path())?);
        Self::with_stores(config, cookies, local, notifier)
    }

    pub fn with_stores(
        config: AppConfig,
        cookies: Arc<dyn KeyValueStore>,
        local: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = Arc::new(Session::hydrate(cookies, Arc::clone(&local)));
        let progress = ProgressTracker::new();
        let (navigator, navigation_requests) = ChannelNavigator::new();

        let client = ApiClient::new(
            &config.api,
            Arc::clone(&session),
            Arc::clone(&notifier),
            Arc::new(navigator),
            progress.clone(),
        )?;

        let permission_store = Arc::new(PermissionStore::new(
            Arc::clone(&session),
            PermissionApi::new(client.clone()),
        ));
        let session_store = Arc::new(SessionStore::new(
            Arc::clone(&session),
            AuthApi::new(client.clone()),
            Arc::clone(&permission_store),
            Arc::clone(&notifier),
        ));
        let router = Arc::new(Router::new(
            Arc::clone(&session_store),
            Arc::clone(&permission_store),
            Arc::clone(&notifier),
            config.app.title.clone(),
        ));
        let preferences = Arc::new(PreferenceStore::load(local));

        info!(base_url = %config.api.base_url, logged_in = session.is_logged_in(), "Console initialized");

        Ok(Self {
            config,
            session,
            client,
            session_store,
            permission_store,
            preferences,
            router,
            progress,
            navigation_requests: Mutex::new(navigation_requests),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.session_store
    }

    pub fn permission_store(&self) -> &Arc<PermissionStore> {
        &self.permission_store
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn users(&self) -> UserApi {
        UserApi::new(self.client.clone())
    }

    pub fn roles(&self) -> RoleApi {
        RoleApi::new(self.client.clone())
    }

    pub fn permissions(&self) -> PermissionApi {
        PermissionApi::new(self.client.clone())
    }

    pub fn system(&self) -> SystemApi {
        SystemApi::new(self.client.clone())
    }

    pub fn logs(&self) -> LogApi {
        LogApi::new(self.client.clone())
    }

    /// 导航并同步面包屑与标签页，随后处理请求过程中产生的跳转
    pub async fn navigate(&self, to: impl Into<Location>) -> Result<Navigation> {
        let mut navigation = self.router.push(to).await?;
        self.apply_chrome(&navigation);

        while let Some(next) = self.drain_navigation().await {
            navigation = next;
        }
        Ok(navigation)
    }

    /// 处理排队的跳转请求，返回最后一次成功的导航
    pub async fn drain_navigation(&self) -> Option<Navigation> {
        let mut last = None;
        loop {
            let next = self.navigation_requests.lock().try_recv().ok();
            let Some(location) = next else {
                return last;
            };
            let Some(location) = self.resolve_queued(location) else {
                debug!("Queued login skipped, already on login page");
                continue;
            };

            match self.router.push(location).await {
                Ok(navigation) => {
                    self.apply_chrome(&navigation);
                    last = Some(navigation);
                }
                Err(e) if is_superseded(&e) => debug!("Queued navigation superseded"),
                Err(e) => debug!(error = %e, "Queued navigation failed"),
            }
        }
    }

    /// 排队的登录跳转保留当前页面作为 redirect，已在登录页时丢弃
    fn resolve_queued(&self, location: Location) -> Option<Location> {
        if location.path != LOGIN_PATH || !location.query.is_empty() {
            return Some(location);
        }
        match self.router.current() {
            Some(current) if current.location.path == LOGIN_PATH => None,
            Some(current) if !WHITELIST.contains(&current.location.path.as_str()) => {
                Some(location.with_query("redirect", current.location.full_path()))
            }
            _ => Some(location),
        }
    }

    fn apply_chrome(&self, navigation: &Navigation) {
        let path = &navigation.location.path;
        self.preferences
            .set_breadcrumbs(self.permission_store.get_breadcrumbs(path));

        let route = &navigation.route;
        if let Some(name) = route.name.as_deref() {
            if !route.meta.hidden && !route.is_fallback {
                let tab = Tab::new(name, route.meta.title.clone(), path.clone());
                self.preferences
                    .add_tab(if route.meta.affix { tab.pinned() } else { tab });
            }
        }
    }

    /// 退出登录并回到只有基础路由的状态
    pub async fn logout(&self) {
        self.session_store.logout().await;
        self.router.reset();
        self.preferences.close_all_tabs();
    }
}
