/// Token 自动刷新模块
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

use crate::mail::gmail::oauth::IdentityClient;
use crate::mail::gmail::types::TokenSet;
use crate::storage::TokenStore;

/// Token 刷新器
///
/// Token 未过期时原样返回；已过期时通过身份客户端刷新，并局部更新到 Token 存储
///
/// 同一邮箱的并发刷新不做互斥，存储以最后一次写入为准
#[derive(Clone)]
pub struct TokenRefresher {
    store: Arc<dyn TokenStore>,
}

impl TokenRefresher {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// 获取有效的 Token
    ///
    /// # Arguments
    /// * `identity_client` - 身份客户端
    /// * `email` - 邮箱地址（存储记录的主键）
    /// * `tokens` - 当前已知的 Token
    ///
    /// # Returns
    /// 未过期时返回 `tokens` 本身，否则返回新凭据
    ///
    /// # Errors
    /// 身份服务和存储的错误原样返回
    pub async fn refresh_access_token(
        &self,
        identity_client: &mut dyn IdentityClient,
        email: &str,
        tokens: TokenSet,
    ) -> Result<TokenSet> {
        self.refresh_access_token_at(identity_client, email, tokens, Utc::now().timestamp_millis())
            .await
    }

    async fn refresh_access_token_at(
        &self,
        identity_client: &mut dyn IdentityClient,
        email: &str,
        tokens: TokenSet,
        now_millis: i64,
    ) -> Result<TokenSet> {
        if !tokens.is_expired_at(now_millis) {
            tracing::debug!("{} 的 Access Token 仍然有效（过期时间: {}）", email, tokens.expiry_date);
            return Ok(tokens);
        }

        tracing::info!("{} 的 Access Token 已过期（{}），开始刷新", email, tokens.expiry_date);

        // 1. 设置当前凭据
        identity_client.set_credentials(tokens.credentials());

        // 2. 获取新的凭据
        let credentials = identity_client.refresh_access_token().await?;

        // 3. 只更新三个 Token 字段
        self.store.update_tokens(email, &credentials).await?;

        tracing::info!(
            "✅ {} 的 Access Token 刷新成功（新的过期时间: {}）",
            email,
            credentials.expiry_date
        );

        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::gmail::types::Credentials;
    use crate::storage::{InMemoryTokenStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    const EMAIL: &str = "ana@example.com";
    const NOW: i64 = 1_700_000_000_000;

    /// 记录调用的身份客户端
    #[derive(Default)]
    struct FakeIdentityClient {
        credentials_set: Vec<Credentials>,
        refresh_calls: usize,
        fail: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("invalid_grant")]
    struct InvalidGrant;

    #[async_trait]
    impl IdentityClient for FakeIdentityClient {
        fn set_credentials(&mut self, credentials: Credentials) {
            self.credentials_set.push(credentials);
        }

        async fn refresh_access_token(&mut self) -> Result<TokenSet> {
            self.refresh_calls += 1;
            if self.fail {
                return Err(InvalidGrant.into());
            }
            Ok(new_tokens())
        }
    }

    /// 记录写入的存储
    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<(String, TokenSet)>>,
    }

    #[async_trait]
    impl TokenStore for RecordingStore {
        async fn update_tokens(&self, email: &str, tokens: &TokenSet) -> Result<()> {
            self.writes
                .lock()
                .await
                .push((email.to_string(), tokens.clone()));
            Ok(())
        }

        async fn get_tokens(&self, _email: &str) -> Result<Option<TokenSet>> {
            Ok(None)
        }
    }

    fn old_tokens(expiry_date: i64) -> TokenSet {
        TokenSet::new("access-old", "refresh-old", expiry_date)
    }

    fn new_tokens() -> TokenSet {
        TokenSet::new("access-new", "refresh-new", NOW + 3_600_000)
    }

    #[tokio::test]
    async fn test_fresh_token_is_returned_unchanged() {
        let store = Arc::new(RecordingStore::default());
        let refresher = TokenRefresher::new(store.clone());
        let mut client = FakeIdentityClient::default();

        let tokens = old_tokens(NOW + 1);
        let result = refresher
            .refresh_access_token_at(&mut client, EMAIL, tokens.clone(), NOW)
            .await
            .unwrap();

        assert_eq!(result, tokens);
        assert!(client.credentials_set.is_empty());
        assert_eq!(client.refresh_calls, 0);
        assert!(store.writes.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_token_with_real_clock() {
        let store = Arc::new(RecordingStore::default());
        let refresher = TokenRefresher::new(store.clone());
        let mut client = FakeIdentityClient::default();

        let tokens = old_tokens(Utc::now().timestamp_millis() + 600_000);
        let result = refresher
            .refresh_access_token(&mut client, EMAIL, tokens.clone())
            .await
            .unwrap();

        assert_eq!(result, tokens);
        assert_eq!(client.refresh_calls, 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_stored() {
        let store = Arc::new(RecordingStore::default());
        let refresher = TokenRefresher::new(store.clone());
        let mut client = FakeIdentityClient::default();

        let result = refresher
            .refresh_access_token_at(&mut client, EMAIL, old_tokens(NOW - 1), NOW)
            .await
            .unwrap();

        assert_eq!(result, new_tokens());
        assert_eq!(
            client.credentials_set,
            vec![Credentials {
                access_token: "access-old".to_string(),
                refresh_token: "refresh-old".to_string(),
            }]
        );
        assert_eq!(client.refresh_calls, 1);
        assert_eq!(
            *store.writes.lock().await,
            vec![(EMAIL.to_string(), new_tokens())]
        );
    }

    #[tokio::test]
    async fn test_expiry_equal_to_now_is_expired() {
        let store = Arc::new(RecordingStore::default());
        let refresher = TokenRefresher::new(store.clone());
        let mut client = FakeIdentityClient::default();

        refresher
            .refresh_access_token_at(&mut client, EMAIL, old_tokens(NOW), NOW)
            .await
            .unwrap();

        assert_eq!(client.refresh_calls, 1);
        assert_eq!(store.writes.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_updates_only_token_fields() {
        let store = Arc::new(InMemoryTokenStore::new());
        store
            .put_record(
                EMAIL,
                json!({
                    "email": EMAIL,
                    "user_id": "u-123",
                    "tokens": {
                        "access_token": "access-old",
                        "refresh_token": "refresh-old",
                        "expiry_date": NOW - 1,
                        "token_type": "Bearer",
                    },
                }),
            )
            .await;

        let refresher = TokenRefresher::new(store.clone());
        let mut client = FakeIdentityClient::default();
        refresher
            .refresh_access_token_at(&mut client, EMAIL, old_tokens(NOW - 1), NOW)
            .await
            .unwrap();

        let record = store.record(EMAIL).await.unwrap();
        assert_eq!(record["user_id"], "u-123");
        assert_eq!(record["tokens"]["token_type"], "Bearer");
        assert_eq!(store.get_tokens(EMAIL).await.unwrap(), Some(new_tokens()));
    }

    #[tokio::test]
    async fn test_identity_error_propagates_without_write() {
        let store = Arc::new(RecordingStore::default());
        let refresher = TokenRefresher::new(store.clone());
        let mut client = FakeIdentityClient {
            fail: true,
            ..FakeIdentityClient::default()
        };

        let err = refresher
            .refresh_access_token_at(&mut client, EMAIL, old_tokens(NOW - 1), NOW)
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<InvalidGrant>().is_some());
        assert!(store.writes.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        // 存储中没有该邮箱的记录
        let store = Arc::new(InMemoryTokenStore::new());
        let refresher = TokenRefresher::new(store);
        let mut client = FakeIdentityClient::default();

        let err = refresher
            .refresh_access_token_at(&mut client, EMAIL, old_tokens(NOW - 1), NOW)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::RecordNotFound { .. })
        ));
        assert_eq!(client.refresh_calls, 1);
    }
}
