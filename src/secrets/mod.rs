/// 参数存储（密钥读取）模块
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
#[cfg(feature = "aws")]
pub mod ssm;

pub use memory::InMemoryParameterStore;
#[cfg(feature = "aws")]
pub use ssm::SsmParameterStore;

/// 读取参数的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetParameterRequest {
    /// 参数名
    pub name: String,

    /// 是否要求服务端解密（SecureString）
    pub with_decryption: bool,
}

/// 参数存储返回的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// 参数存储后端
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// 读取单个参数
    ///
    /// # Errors
    /// - 参数不存在
    /// - 无权限或连接失败
    async fn get_parameter(&self, request: &GetParameterRequest) -> Result<Parameter>;
}

/// 密钥读取器
#[derive(Clone)]
pub struct SecretFetcher {
    store: Arc<dyn ParameterStore>,
}

impl SecretFetcher {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    /// 读取参数值
    ///
    /// 只发起一次请求，原样返回参数值；错误不做任何处理直接返回
    ///
    /// # Arguments
    /// * `name` - 参数名
    /// * `with_decryption` - 是否要求服务端解密
    pub async fn get_parameter_store(&self, name: &str, with_decryption: bool) -> Result<String> {
        let request = GetParameterRequest {
            name: name.to_string(),
            with_decryption,
        };

        tracing::debug!("读取参数 {}（解密: {}）", name, with_decryption);

        let parameter = self.store.get_parameter(&request).await?;
        Ok(parameter.value)
    }

    /// 读取参数值，不要求解密
    pub async fn get_parameter(&self, name: &str) -> Result<String> {
        self.get_parameter_store(name, false).await
    }
}

/// 内存参数存储的错误
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("参数不存在: {0}")]
    ParameterNotFound(String),
}
