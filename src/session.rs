//! 会话状态
//! 令牌、用户信息与已授权权限集合；令牌持久化到 cookie 存储，用户信息持久化到本地存储

use crate::error::Result;
use crate::models::{User, SUPER_ADMIN};
use crate::storage::KeyValueStore;
use chrono::Duration;
use parking_lot::RwLock;
use secrecy::{ExposeSecret, Secret};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const TOKEN_KEY: &str = "rbac_token";
pub const REFRESH_TOKEN_KEY: &str = "rbac_refresh_token";
pub const USER_INFO_KEY: &str = "rbac_user_info";

/// 访问令牌 cookie 有效期
pub fn access_token_ttl() -> Duration {
    Duration::days(7)
}

/// 刷新令牌 cookie 有效期
pub fn refresh_token_ttl() -> Duration {
    Duration::days(30)
}

#[derive(Default)]
struct SessionData {
    access_token: Option<Secret<String>>,
    refresh_token: Option<Secret<String>>,
    profile: Option<User>,
    permissions: HashSet<String>,
    /// 本会话内是否已从后端取得权限列表（权限列表不落盘）
    permissions_loaded: bool,
    routes_generated: bool,
}

/// 某一时刻的会话只读快照
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub epoch: u64,
    pub profile: Option<User>,
    pub permissions: HashSet<String>,
    pub is_super_admin: bool,
}

/// 共享会话
///
/// `epoch` 在每次建立或清空会话时递增，缓存据此判断是否属于当前会话
pub struct Session {
    data: RwLock<SessionData>,
    cookies: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
    epoch: AtomicU64,
}

impl Session {
    /// 从持久化存储恢复会话
    pub fn hydrate(cookies: Arc<dyn KeyValueStore>, local: Arc<dyn KeyValueStore>) -> Self {
        let non_blank = |v: String| if v.trim().is_empty() { None } else { Some(v) };
        let access_token = cookies.get(TOKEN_KEY).and_then(non_blank).map(Secret::new);
        let refresh_token = cookies.get(REFRESH_TOKEN_KEY).and_then(non_blank).map(Secret::new);

        let profile = match local.get(USER_INFO_KEY) {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable persisted profile");
                    if let Err(e) = local.remove(USER_INFO_KEY) {
                        tracing::warn!(error = %e, "Failed to remove persisted profile");
                    }
                    None
                }
            },
            None => None,
        };

        tracing::debug!(
            has_token = access_token.is_some(),
            has_profile = profile.is_some(),
            "Session hydrated"
        );

        Self {
            data: RwLock::new(SessionData {
                access_token,
                refresh_token,
                profile,
                ..Default::default()
            }),
            cookies,
            local,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 当前访问令牌（非空白时）
    pub fn access_token(&self) -> Option<String> {
        self.data
            .read()
            .access_token
            .as_ref()
            .map(|t| t.expose_secret().clone())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.data
            .read()
            .refresh_token
            .as_ref()
            .map(|t| t.expose_secret().clone())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn profile(&self) -> Option<User> {
        self.data.read().profile.clone()
    }

    pub fn permissions(&self) -> HashSet<String> {
        self.data.read().permissions.clone()
    }

    pub fn permissions_loaded(&self) -> bool {
        self.data.read().permissions_loaded
    }

    pub fn routes_generated(&self) -> bool {
        self.data.read().routes_generated
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.data.read().permissions.contains(code)
    }

    pub fn has_role(&self, role_code: &str) -> bool {
        self.data
            .read()
            .profile
            .as_ref()
            .is_some_and(|p| p.has_role(role_code))
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(SUPER_ADMIN)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let data = self.data.read();
        SessionSnapshot {
            epoch: self.epoch(),
            profile: data.profile.clone(),
            permissions: data.permissions.clone(),
            is_super_admin: data.profile.as_ref().is_some_and(|p| p.has_role(SUPER_ADMIN)),
        }
    }

    /// 登录成功后一次性写入令牌、用户信息与权限
    ///
    /// 持久化全部成功才修改内存状态；令牌写入失败时回滚已写入的用户信息
    pub fn establish(
        &self,
        access_token: &str,
        refresh_token: &str,
        profile: User,
        permissions: Vec<String>,
    ) -> Result<()> {
        let profile_json = serde_json::to_string(&profile)?;
        self.local.set(USER_INFO_KEY, &profile_json, None)?;

        if let Err(e) = self.persist_tokens(access_token, refresh_token) {
            if let Err(rollback) = self.local.remove(USER_INFO_KEY) {
                tracing::warn!(error = %rollback, "Failed to roll back persisted profile");
            }
            return Err(e);
        }

        let mut data = self.data.write();
        *data = SessionData {
            access_token: Some(Secret::new(access_token.to_string())),
            refresh_token: Some(Secret::new(refresh_token.to_string())),
            profile: Some(profile),
            permissions: permissions.into_iter().collect(),
            permissions_loaded: true,
            routes_generated: false,
        };
        let epoch = self.bump_epoch();
        drop(data);

        tracing::info!(epoch, "Session established");
        Ok(())
    }

    fn persist_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.cookies.set_many(&[
            (TOKEN_KEY, access_token, Some(access_token_ttl())),
            (REFRESH_TOKEN_KEY, refresh_token, Some(refresh_token_ttl())),
        ])
    }

    /// 刷新令牌后替换令牌对
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.persist_tokens(access_token, refresh_token)?;
        let mut data = self.data.write();
        data.access_token = Some(Secret::new(access_token.to_string()));
        data.refresh_token = Some(Secret::new(refresh_token.to_string()));
        Ok(())
    }

    pub fn set_profile(&self, profile: User) -> Result<()> {
        let json = serde_json::to_string(&profile)?;
        self.local.set(USER_INFO_KEY, &json, None)?;
        self.data.write().profile = Some(profile);
        Ok(())
    }

    pub fn set_permissions(&self, permissions: Vec<String>) {
        let mut data = self.data.write();
        data.permissions = permissions.into_iter().collect();
        data.permissions_loaded = true;
    }

    /// 标记动态路由已生成
    ///
    /// 仅当会话仍是 `epoch` 对应的会话且用户信息与权限都已就绪时生效
    pub fn mark_routes_generated(&self, epoch: u64) -> bool {
        let mut data = self.data.write();
        if self.epoch() != epoch || data.profile.is_none() || !data.permissions_loaded {
            return false;
        }
        data.routes_generated = true;
        true
    }

    pub fn reset_routes_generated(&self) {
        self.data.write().routes_generated = false;
    }

    /// 清空内存与持久化的会话数据
    ///
    /// 持久化删除失败只记录日志，本地状态总是被清空
    pub fn clear(&self) {
        {
            let mut data = self.data.write();
            *data = SessionData::default();
            self.bump_epoch();
        }

        if let Err(e) = self.cookies.remove_many(&[TOKEN_KEY, REFRESH_TOKEN_KEY]) {
            tracing::warn!(error = %e, "Failed to remove persisted tokens");
        }
        if let Err(e) = self.local.remove(USER_INFO_KEY) {
            tracing::warn!(error = %e, "Failed to remove persisted profile");
        }

        tracing::info!(epoch = self.epoch(), "Session cleared");
    }
}
