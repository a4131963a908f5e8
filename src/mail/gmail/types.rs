/// Gmail 相关数据结构
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 用户邮箱的 OAuth2 Token 集合
///
/// 以邮箱地址为键持久化在 Token 存储中，位于记录的 `tokens` 属性下
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// 访问令牌
    pub access_token: String,

    /// 刷新令牌
    pub refresh_token: String,

    /// 访问令牌过期时间（Unix 毫秒时间戳）
    pub expiry_date: i64,
}

impl TokenSet {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expiry_date: i64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expiry_date,
        }
    }

    /// 检查 Token 是否已过期
    ///
    /// 过期时间严格大于当前时间才算有效
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.expiry_date <= now_millis
    }

    /// 以当前时间检查 Token 是否已过期
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    /// 提取交给身份客户端的凭据
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// 设置到身份客户端上的凭据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

/// 邮件的一个 MIME 部分（Gmail API `payload.parts[]`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,

    /// MIME 类型，例如 `text/plain`、`text/html`
    #[serde(default)]
    pub mime_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default)]
    pub body: MessagePartBody,
}

impl MessagePart {
    /// 构造一个只包含 MIME 类型和 Base64 数据的部分
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            part_id: None,
            mime_type: mime_type.into(),
            filename: None,
            body: MessagePartBody { data: data.into() },
        }
    }
}

/// MIME 部分的正文（Base64 编码）
///
/// 附件类部分没有 `data` 字段，反序列化为空字符串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePartBody {
    #[serde(default)]
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry_is_strict() {
        let tokens = TokenSet::new("access", "refresh", 1_000);

        assert!(!tokens.is_expired_at(999));
        // 过期时间等于当前时间视为已过期
        assert!(tokens.is_expired_at(1_000));
        assert!(tokens.is_expired_at(1_001));
    }

    #[test]
    fn test_token_set_json_shape() {
        let tokens = TokenSet::new("ya29.a0", "1//0g", 1_700_000_000_000);
        let value = serde_json::to_value(&tokens).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "access_token": "ya29.a0",
                "refresh_token": "1//0g",
                "expiry_date": 1_700_000_000_000i64,
            })
        );
    }

    #[test]
    fn test_deserialize_gmail_parts() {
        let json = r#"[
            {
                "partId": "0",
                "mimeType": "text/plain",
                "filename": "",
                "headers": [{ "name": "Content-Type", "value": "text/plain; charset=UTF-8" }],
                "body": { "size": 2, "data": "aGk" }
            },
            {
                "partId": "1",
                "mimeType": "application/pdf",
                "filename": "fatura.pdf",
                "body": { "attachmentId": "ANGjdJ8", "size": 1024 }
            }
        ]"#;

        let parts: Vec<MessagePart> = serde_json::from_str(json).unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].mime_type, "text/plain");
        assert_eq!(parts[0].body.data, "aGk");
        assert_eq!(parts[1].filename.as_deref(), Some("fatura.pdf"));
        assert!(parts[1].body.data.is_empty());
    }
}
