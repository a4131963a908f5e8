/// OAuth2 配置读取模块
///
/// 支持从参数存储（Google Cloud Console 凭据 JSON）或环境变量读取 OAuth2 客户端凭据
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::secrets::SecretFetcher;

/// Google OAuth2 授权端点
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth2 Token 端点
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Google OAuth2 客户端 ID
    pub client_id: String,

    /// Google OAuth2 客户端密钥
    pub client_secret: String,

    /// 授权端点
    pub auth_url: String,

    /// Token 端点（刷新 Token 时使用）
    pub token_url: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: "YOUR_CLIENT_ID.apps.googleusercontent.com".to_string(),
            client_secret: "YOUR_CLIENT_SECRET".to_string(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }
}

/// Google Cloud Console 凭据文件格式
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<GoogleClientSection>,
    web: Option<GoogleClientSection>,
}

#[derive(Deserialize)]
struct GoogleClientSection {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl OAuthConfig {
    /// 从环境变量读取，两个变量都存在才返回
    pub fn from_env() -> Option<Self> {
        let (Ok(client_id), Ok(client_secret)) = (
            std::env::var("GMAIL_CLIENT_ID"),
            std::env::var("GMAIL_CLIENT_SECRET"),
        ) else {
            return None;
        };

        let mut cfg = Self::default();
        cfg.client_id = client_id;
        cfg.client_secret = client_secret;

        if let Ok(token_url) = std::env::var("GMAIL_TOKEN_URL") {
            cfg.token_url = token_url;
        }

        Some(cfg)
    }

    /// 从参数存储读取 Google 凭据 JSON
    ///
    /// 参数名和是否解密由 [`AppConfig`] 指定
    ///
    /// # Errors
    /// - 参数读取失败
    /// - JSON 缺少 `installed` / `web` 段
    pub async fn load_from_parameter_store(
        fetcher: &SecretFetcher,
        app_config: &AppConfig,
    ) -> Result<Self> {
        let json = fetcher
            .get_parameter_store(
                &app_config.google_credentials_parameter,
                app_config.google_credentials_decrypt,
            )
            .await?;

        let config = Self::from_json(&json).with_context(|| {
            format!(
                "参数 {} 不是有效的 Google 凭据",
                app_config.google_credentials_parameter
            )
        })?;

        tracing::info!(
            "✅ 从参数存储加载 OAuth2 配置: {}",
            app_config.google_credentials_parameter
        );
        Ok(config)
    }

    /// 加载 OAuth2 配置
    ///
    /// 优先级（从高到低）：
    /// 1. 参数存储中的 Google 凭据 JSON
    /// 2. `fallback`（通常为 [`OAuthConfig::from_env`]）
    ///
    /// 参数读取失败且没有 `fallback` 时返回参数存储的错误
    pub async fn load_with_fallback(
        fetcher: &SecretFetcher,
        app_config: &AppConfig,
        fallback: Option<Self>,
    ) -> Result<Self> {
        match Self::load_from_parameter_store(fetcher, app_config).await {
            Ok(config) => Ok(config),
            Err(e) => match fallback {
                Some(config) => {
                    tracing::warn!("⚠️ 从参数存储加载 OAuth2 配置失败，改用环境变量: {}", e);
                    Ok(config)
                }
                None => Err(e),
            },
        }
    }

    /// 解析 Google Cloud Console 凭据 JSON（支持 `installed` 和 `web` 两种类型）
    pub fn from_json(json: &str) -> Result<Self> {
        let file: GoogleCredentialFile =
            serde_json::from_str(json).context("解析 Google 凭据 JSON 失败")?;

        let section = file
            .installed
            .or(file.web)
            .context("凭据 JSON 缺少 installed 或 web 段")?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            auth_url: section
                .auth_uri
                .unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
            token_url: section
                .token_uri
                .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
        })
    }

    /// 验证配置是否为默认占位符
    pub fn is_placeholder(&self) -> bool {
        self.client_id.contains("YOUR_CLIENT_ID")
            || self.client_secret.contains("YOUR_CLIENT_SECRET")
    }
}
