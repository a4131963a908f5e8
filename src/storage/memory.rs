/// 内存 Token 存储
///
/// 用于测试和本地开发，记录以 JSON 文档保存
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DEFAULT_TOKEN_TABLE, StoreError, TokenStore};
use crate::mail::gmail::types::TokenSet;

/// 内存 Token 存储
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    /// 邮箱 -> 整条记录
    records: RwLock<HashMap<String, Value>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入整条记录（覆盖已有记录）
    pub async fn put_record(&self, email: &str, record: Value) {
        self.records.write().await.insert(email.to_string(), record);
    }

    /// 写入只包含 `email` 和 `tokens` 的记录
    pub async fn put_tokens(&self, email: &str, tokens: &TokenSet) {
        let record = serde_json::json!({
            "email": email,
            "tokens": tokens,
        });
        self.put_record(email, record).await;
    }

    /// 读取整条记录
    pub async fn record(&self, email: &str) -> Option<Value> {
        self.records.read().await.get(email).cloned()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn update_tokens(&self, email: &str, tokens: &TokenSet) -> Result<()> {
        let mut records = self.records.write().await;

        let record = records
            .get_mut(email)
            .ok_or_else(|| StoreError::RecordNotFound {
                table: DEFAULT_TOKEN_TABLE.to_string(),
                email: email.to_string(),
            })?;

        let token_map = record
            .get_mut("tokens")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| StoreError::InvalidDocumentPath {
                path: "tokens.access_token".to_string(),
            })?;

        set_token_fields(token_map, tokens);

        tracing::debug!("内存存储已更新 {} 的 Token", email);
        Ok(())
    }

    async fn get_tokens(&self, email: &str) -> Result<Option<TokenSet>> {
        let records = self.records.read().await;

        let Some(tokens) = records.get(email).and_then(|r| r.get("tokens")) else {
            return Ok(None);
        };

        let tokens: TokenSet =
            serde_json::from_value(tokens.clone()).map_err(StoreError::MalformedTokens)?;
        Ok(Some(tokens))
    }
}

/// 只覆盖三个 Token 字段，`tokens` 下的其他字段保留
fn set_token_fields(token_map: &mut Map<String, Value>, tokens: &TokenSet) {
    token_map.insert(
        "access_token".to_string(),
        Value::String(tokens.access_token.clone()),
    );
    token_map.insert(
        "refresh_token".to_string(),
        Value::String(tokens.refresh_token.clone()),
    );
    token_map.insert("expiry_date".to_string(), Value::from(tokens.expiry_date));
}
