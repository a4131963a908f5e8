/// Gmail OAuth2 身份客户端
///
/// 身份客户端只负责两件事：接收当前凭据、用 Refresh Token 交换新的 Access Token
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
    basic::BasicClient, reqwest::async_http_client,
};
use std::time::Duration;

use crate::config::oauth_config::OAuthConfig;
use crate::mail::gmail::types::{Credentials, TokenSet};

/// 服务端未返回 expires_in 时使用的有效期
const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(3600);

/// OAuth2 身份客户端
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// 设置当前的访问令牌和刷新令牌
    fn set_credentials(&mut self, credentials: Credentials);

    /// 使用已设置的 Refresh Token 获取新的凭据
    ///
    /// # Errors
    /// - 未设置凭据
    /// - Refresh Token 无效或已被撤销
    /// - 网络请求失败
    async fn refresh_access_token(&mut self) -> Result<TokenSet>;
}

/// 基于 `oauth2` crate 的 Google 身份客户端
pub struct GoogleOAuthClient {
    client: BasicClient,
    credentials: Option<Credentials>,
}

impl GoogleOAuthClient {
    /// 创建 Google 身份客户端
    ///
    /// # Errors
    /// 授权端点或 Token 端点 URL 无效
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone())?,
            Some(TokenUrl::new(config.token_url.clone())?),
        );

        Ok(Self {
            client,
            credentials: None,
        })
    }

    /// 当前凭据（刷新成功后为新凭据）
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

#[async_trait]
impl IdentityClient for GoogleOAuthClient {
    fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    async fn refresh_access_token(&mut self) -> Result<TokenSet> {
        let current_refresh_token = self
            .credentials
            .as_ref()
            .map(|c| c.refresh_token.clone())
            .ok_or_else(|| anyhow!("未设置凭据，无法刷新 Access Token"))?;

        tracing::debug!("向 Token 端点请求新的 Access Token");

        let token_response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(current_refresh_token.clone()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                if let RequestTokenError::ServerResponse(response) = &e {
                    tracing::error!("❌ Token 刷新失败 [授权被拒绝/已过期]: {}", response);
                    tracing::error!(
                        "   💡 可能原因:\n   \
                         - Refresh Token 已过期或被撤销\n   \
                         - 用户撤销了应用授权"
                    );
                }
                e
            })?;

        let expires_in = token_response.expires_in().unwrap_or(DEFAULT_EXPIRES_IN);
        let expiry_date = expiry_after(Utc::now().timestamp_millis(), expires_in);

        // 刷新响应通常不带新的 Refresh Token，此时沿用当前的
        let refresh_token = token_response
            .refresh_token()
            .map(|t| t.secret().clone())
            .unwrap_or(current_refresh_token);

        let tokens = TokenSet {
            access_token: token_response.access_token().secret().clone(),
            refresh_token,
            expiry_date,
        };

        self.credentials = Some(tokens.credentials());
        Ok(tokens)
    }
}

/// 计算过期时间（毫秒），超出 i64 范围时取 `i64::MAX`
fn expiry_after(now_millis: i64, expires_in: Duration) -> i64 {
    i64::try_from(expires_in.as_millis())
        .ok()
        .and_then(|ms| now_millis.checked_add(ms))
        .unwrap_or(i64::MAX)
}
