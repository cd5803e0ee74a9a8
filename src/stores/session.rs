//! 用户会话操作：登录、退出、刷新令牌与用户信息维护

use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::api::AuthApi;
use crate::error::{ConsoleError, ErrorKind, Result};
use crate::models::auth::{Captcha, ChangePasswordRequest, LoginRequest, LoginResponse, ProfileUpdate};
use crate::models::{Role, User};
use crate::session::Session;
use crate::shell::Notifier;

use super::PermissionStore;

pub struct SessionStore {
    session: Arc<Session>,
    api: AuthApi,
    permissions: Arc<PermissionStore>,
    notifier: Arc<dyn Notifier>,
}

impl SessionStore {
    pub fn new(
        session: Arc<Session>,
        api: AuthApi,
        permissions: Arc<PermissionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            api,
            permissions,
            notifier,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn get_captcha(&self) -> Result<Captcha> {
        self.api.captcha().await
    }

    /// 登录；失败时保持原有会话不变
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        request.validate()?;

        let response = self.api.login(request).await.map_err(|e| match e.kind() {
            // 后端拒绝凭据或验证码
            ErrorKind::Business | ErrorKind::Validation | ErrorKind::Permission => {
                ConsoleError::auth(e.user_message())
            }
            _ => e,
        })?;

        self.session.establish(
            &response.token,
            &response.refresh_token,
            response.user.clone(),
            response.permissions.clone(),
        )?;

        info!(user_id = response.user.id, username = %response.user.username, "Logged in");
        self.notifier.success("Login successful");
        Ok(response)
    }

    /// 退出登录：通知后端失败只记录日志，本地状态总是被清空
    pub async fn logout(&self) {
        if self.session.is_logged_in() {
            if let Err(e) = self.api.logout().await {
                warn!(error = %e, "Logout request failed");
            }
        }
        self.clear_user_data();
        self.notifier.success("Logged out");
    }

    /// 拉取用户信息与权限；任何失败都会清空会话
    pub async fn get_user_info(&self) -> Result<User> {
        match self.fetch_user_info().await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(error = %e, code = e.code(), "Failed to load user information");
                self.clear_user_data();
                if e.clears_session() {
                    return Err(e);
                }
                Err(ConsoleError::auth(format!(
                    "Failed to load user information: {}",
                    e.user_message()
                )))
            }
        }
    }

    async fn fetch_user_info(&self) -> Result<User> {
        let user = self.api.current_user().await?;
        self.session.set_profile(user.clone())?;

        let permissions = self.api.current_permissions().await?;
        self.session.set_permissions(permissions);
        Ok(user)
    }

    /// 用刷新令牌换取新的令牌对，返回新的访问令牌
    pub async fn refresh_access_token(&self) -> Result<String> {
        let Some(refresh_token) = self.session.refresh_token() else {
            self.clear_user_data();
            return Err(ConsoleError::auth("No refresh token"));
        };

        let result = match self.api.refresh(&refresh_token).await {
            Ok(pair) => self
                .session
                .set_tokens(&pair.token, &pair.refresh_token)
                .map(|_| pair.token),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(error = %e, "Token refresh failed");
            self.clear_user_data();
        }
        result
    }

    pub async fn update_user_info(&self, patch: &ProfileUpdate) -> Result<User> {
        let user = self.api.update_profile(patch).await?;
        self.session.set_profile(user.clone())?;
        self.notifier.success("Profile updated");
        Ok(user)
    }

    /// 修改密码，成功后需要重新登录
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        self.api.change_password(request).await?;
        self.notifier.success("Password changed, please log in again");
        self.logout().await;
        Ok(())
    }

    /// 清空会话与权限缓存
    pub fn clear_user_data(&self) {
        self.session.clear();
        self.permissions.reset_permissions();
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session.profile().map(|u| u.id)
    }

    pub fn username(&self) -> Option<String> {
        self.session.profile().map(|u| u.username)
    }

    pub fn nickname(&self) -> Option<String> {
        self.session.profile().map(|u| u.nickname)
    }

    pub fn avatar(&self) -> Option<String> {
        self.session.profile().and_then(|u| u.avatar)
    }

    pub fn roles(&self) -> Vec<Role> {
        self.session.profile().map(|u| u.roles).unwrap_or_default()
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.session.has_permission(code)
    }

    pub fn has_role(&self, role_code: &str) -> bool {
        self.session.has_role(role_code)
    }

    pub fn is_super_admin(&self) -> bool {
        self.session.is_super_admin()
    }
}
