/// AWS SSM Parameter Store 后端
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_ssm::Client;

use super::{GetParameterRequest, Parameter, ParameterStore};

/// SSM 参数存储
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, request: &GetParameterRequest) -> Result<Parameter> {
        let output = self
            .client
            .get_parameter()
            .name(&request.name)
            .with_decryption(request.with_decryption)
            .send()
            .await?;

        let parameter = output
            .parameter()
            .with_context(|| format!("SSM 响应缺少 Parameter: {}", request.name))?;

        let value = parameter
            .value()
            .with_context(|| format!("SSM 参数缺少 Value: {}", request.name))?;

        Ok(Parameter {
            name: parameter.name().unwrap_or(request.name.as_str()).to_string(),
            value: value.to_string(),
        })
    }
}
