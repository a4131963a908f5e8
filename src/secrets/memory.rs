/// 内存参数存储
///
/// 用于测试和本地开发，会记录收到的每个请求
use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{GetParameterRequest, Parameter, ParameterStore, SecretError};

/// 未解密读取 SecureString 时返回值的前缀
const ENCRYPTED_PREFIX: &str = "encrypted:";

#[derive(Debug, Clone)]
struct StoredParameter {
    value: String,
    secure: bool,
}

/// 内存参数存储
#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    parameters: Mutex<HashMap<String, StoredParameter>>,
    requests: Mutex<Vec<GetParameterRequest>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入普通参数（String）
    pub async fn put(&self, name: &str, value: &str) {
        self.insert(name, value, false).await;
    }

    /// 写入加密参数（SecureString）
    pub async fn put_secure(&self, name: &str, value: &str) {
        self.insert(name, value, true).await;
    }

    /// 已收到的请求（按顺序）
    pub async fn requests(&self) -> Vec<GetParameterRequest> {
        self.requests.lock().await.clone()
    }

    async fn insert(&self, name: &str, value: &str, secure: bool) {
        self.parameters.lock().await.insert(
            name.to_string(),
            StoredParameter {
                value: value.to_string(),
                secure,
            },
        );
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameter(&self, request: &GetParameterRequest) -> Result<Parameter> {
        self.requests.lock().await.push(request.clone());

        let parameters = self.parameters.lock().await;
        let stored = parameters
            .get(&request.name)
            .ok_or_else(|| SecretError::ParameterNotFound(request.name.clone()))?;

        // 与 SSM 一致：SecureString 不解密时返回密文
        let value = if stored.secure && !request.with_decryption {
            format!("{}{}", ENCRYPTED_PREFIX, BASE64.encode(&stored.value))
        } else {
            stored.value.clone()
        };

        Ok(Parameter {
            name: request.name.clone(),
            value,
        })
    }
}
