/// DynamoDB Token 存储
///
/// 表结构：主键 `email`（S），Token 保存在 Map 类型的 `tokens` 属性下
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use std::collections::HashMap;

use super::{DEFAULT_TOKEN_TABLE, TokenStore};
use crate::mail::gmail::types::TokenSet;

/// 只更新三个 Token 字段的表达式
const UPDATE_TOKENS_EXPRESSION: &str = "SET tokens.access_token = :newAccessToken, \
     tokens.refresh_token = :newRefreshToken, \
     tokens.expiry_date = :newExpiryDate";

/// DynamoDB Token 存储
#[derive(Debug, Clone)]
pub struct DynamoTokenStore {
    client: Client,
    table_name: String,
}

impl DynamoTokenStore {
    /// 使用默认表名 `email_tokens`
    pub fn new(client: Client) -> Self {
        Self::with_table(client, DEFAULT_TOKEN_TABLE)
    }

    pub fn with_table(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl TokenStore for DynamoTokenStore {
    async fn update_tokens(&self, email: &str, tokens: &TokenSet) -> Result<()> {
        tracing::debug!("更新 DynamoDB 表 {} 中 {} 的 Token", self.table_name, email);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("email", AttributeValue::S(email.to_string()))
            .update_expression(UPDATE_TOKENS_EXPRESSION)
            .expression_attribute_values(
                ":newAccessToken",
                AttributeValue::S(tokens.access_token.clone()),
            )
            .expression_attribute_values(
                ":newRefreshToken",
                AttributeValue::S(tokens.refresh_token.clone()),
            )
            .expression_attribute_values(
                ":newExpiryDate",
                AttributeValue::N(tokens.expiry_date.to_string()),
            )
            .send()
            .await?;

        Ok(())
    }

    async fn get_tokens(&self, email: &str) -> Result<Option<TokenSet>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("email", AttributeValue::S(email.to_string()))
            .projection_expression("tokens")
            .send()
            .await?;

        let Some(tokens) = output.item().and_then(|item| item.get("tokens")) else {
            return Ok(None);
        };

        let map = tokens
            .as_m()
            .map_err(|_| anyhow!("{} 的 tokens 属性不是 Map 类型", email))?;

        parse_token_map(map).map(Some)
    }
}

/// 将 DynamoDB 的 `tokens` Map 转换为 [`TokenSet`]
fn parse_token_map(map: &HashMap<String, AttributeValue>) -> Result<TokenSet> {
    let string_field = |name: &str| -> Result<String> {
        map.get(name)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| anyhow!("tokens.{} 缺失或不是字符串", name))
    };

    let expiry_date = map
        .get("expiry_date")
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| anyhow!("tokens.expiry_date 缺失或不是数字"))?
        .parse::<i64>()?;

    Ok(TokenSet {
        access_token: string_field("access_token")?,
        refresh_token: string_field("refresh_token")?,
        expiry_date,
    })
}
