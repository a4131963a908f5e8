//! 邮件集成后端的辅助函数
//!
//! - Gmail OAuth2 Access Token 刷新（Token 保存在 DynamoDB `email_tokens` 表）
//! - 从 Gmail 邮件的 MIME 部分提取纯文本 / HTML 正文
//! - 从 SSM Parameter Store 读取密钥
//!
//! 所有外部服务都通过 [`ServiceContext`] 显式注入，便于替换为测试替身

pub mod config;
pub mod context;
pub mod mail;
pub mod secrets;
pub mod storage;
pub mod utils;

pub use config::AppConfig;
pub use config::oauth_config::OAuthConfig;
pub use context::ServiceContext;
pub use mail::gmail::{
    Credentials, GoogleOAuthClient, IdentityClient, MessagePart, MessagePartBody, TokenRefresher,
    TokenSet, get_email_body_html, get_email_body_text,
};
pub use secrets::{GetParameterRequest, Parameter, ParameterStore, SecretFetcher};
pub use storage::{InMemoryTokenStore, TokenStore};
pub use utils::base64::base64_decode;

/// 初始化日志
///
/// 默认级别 `mailbridge=debug,info`，可通过 `RUST_LOG` 覆盖。
/// 宿主程序已经安装了全局 subscriber 时返回错误，不会 panic
pub fn init_logger() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailbridge=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
