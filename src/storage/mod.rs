/// Token 存储模块
///
/// 以邮箱地址为主键保存 OAuth2 Token，记录结构：
/// `{ "email": "...", "tokens": { "access_token", "refresh_token", "expiry_date" }, ... }`
use anyhow::Result;
use async_trait::async_trait;

use crate::mail::gmail::types::TokenSet;

#[cfg(feature = "aws")]
pub mod dynamo;
pub mod memory;

#[cfg(feature = "aws")]
pub use dynamo::DynamoTokenStore;
pub use memory::InMemoryTokenStore;

/// 默认 Token 表名
pub const DEFAULT_TOKEN_TABLE: &str = "email_tokens";

/// Token 存储后端
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 局部更新邮箱记录中的 Token
    ///
    /// 只写入 `tokens.access_token`、`tokens.refresh_token`、`tokens.expiry_date`
    /// 三个字段，记录的其他属性保持不变
    ///
    /// # Errors
    /// - 记录不存在或缺少 `tokens` 属性
    /// - 存储服务连接失败
    async fn update_tokens(&self, email: &str, tokens: &TokenSet) -> Result<()>;

    /// 读取邮箱记录中的 Token
    ///
    /// 记录或 `tokens` 属性不存在时返回 `None`
    async fn get_tokens(&self, email: &str) -> Result<Option<TokenSet>>;
}

/// 内存存储的错误（与 DynamoDB 的行为保持一致）
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("记录不存在: {table}[email={email}]")]
    RecordNotFound { table: String, email: String },

    #[error("更新表达式中的文档路径无效: {path}")]
    InvalidDocumentPath { path: String },

    #[error("tokens 属性格式错误: {0}")]
    MalformedTokens(#[from] serde_json::Error),
}
