use validator::Validate;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::auth::{
    Captcha, ChangePasswordRequest, LoginRequest, LoginResponse, ProfileUpdate,
    RefreshTokenRequest, TokenPair,
};
use crate::models::User;

/// 认证接口
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn captcha(&self) -> Result<Captcha> {
        self.client.get("/auth/captcha").await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        request.validate()?;
        self.client.post("/auth/login", request).await
    }

    pub async fn logout(&self) -> Result<()> {
        // 退出失败由调用方记录日志，不提示用户
        self.client.quiet().post_empty("/auth/logout").await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let body = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.client.post("/auth/refresh", &body).await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.client.get("/auth/user/info").await
    }

    pub async fn current_permissions(&self) -> Result<Vec<String>> {
        self.client.get("/auth/user/permissions").await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        request.validate()?;
        self.client.post("/auth/user/change-password", request).await
    }

    pub async fn update_profile(&self, patch: &ProfileUpdate) -> Result<User> {
        patch.validate()?;
        self.client.put("/auth/user/profile", patch).await
    }
}
