/// 服务上下文
///
/// 显式持有 Token 存储和参数存储，替代全局的服务客户端
use anyhow::Result;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::config::oauth_config::OAuthConfig;
use crate::mail::gmail::{GoogleOAuthClient, TokenRefresher};
use crate::secrets::{ParameterStore, SecretFetcher};
use crate::storage::TokenStore;

/// 后端依赖的外部服务
#[derive(Clone)]
pub struct ServiceContext {
    token_store: Arc<dyn TokenStore>,
    parameter_store: Arc<dyn ParameterStore>,
}

impl ServiceContext {
    pub fn new(token_store: Arc<dyn TokenStore>, parameter_store: Arc<dyn ParameterStore>) -> Self {
        Self {
            token_store,
            parameter_store,
        }
    }

    /// 使用 AWS 默认凭据链创建 DynamoDB + SSM 后端
    ///
    /// `config.aws_region` 非空时覆盖 SDK 解析出的区域
    #[cfg(feature = "aws")]
    pub async fn from_aws(config: &AppConfig) -> Self {
        use crate::secrets::SsmParameterStore;
        use crate::storage::DynamoTokenStore;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.aws_region {
            loader = loader.region(aws_sdk_dynamodb::config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        tracing::info!(
            "🚀 初始化 AWS 服务客户端（区域: {}，Token 表: {}）",
            sdk_config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "<未设置>".to_string()),
            config.token_table
        );

        let token_store = DynamoTokenStore::with_table(
            aws_sdk_dynamodb::Client::new(&sdk_config),
            config.token_table.clone(),
        );
        let parameter_store = SsmParameterStore::new(aws_sdk_ssm::Client::new(&sdk_config));

        Self::new(Arc::new(token_store), Arc::new(parameter_store))
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        self.token_store.clone()
    }

    pub fn token_refresher(&self) -> TokenRefresher {
        TokenRefresher::new(self.token_store.clone())
    }

    pub fn secret_fetcher(&self) -> SecretFetcher {
        SecretFetcher::new(self.parameter_store.clone())
    }

    /// 读取 Google 凭据并创建身份客户端
    ///
    /// 参数存储优先，读取失败时使用 `GMAIL_CLIENT_ID` / `GMAIL_CLIENT_SECRET`
    pub async fn google_oauth_client(&self, config: &AppConfig) -> Result<GoogleOAuthClient> {
        self.google_oauth_client_with_fallback(config, OAuthConfig::from_env())
            .await
    }

    async fn google_oauth_client_with_fallback(
        &self,
        config: &AppConfig,
        fallback: Option<OAuthConfig>,
    ) -> Result<GoogleOAuthClient> {
        let oauth_config =
            OAuthConfig::load_with_fallback(&self.secret_fetcher(), config, fallback).await?;

        if oauth_config.is_placeholder() {
            tracing::warn!("⚠️ 参数存储中的 OAuth2 凭据仍是占位符");
        }

        GoogleOAuthClient::new(&oauth_config)
    }
}
