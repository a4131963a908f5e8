use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::DEFAULT_TOKEN_TABLE;

pub mod oauth_config;

/// 默认的 Google 凭据参数名
pub const DEFAULT_GOOGLE_CREDENTIALS_PARAMETER: &str = "/mailbridge/google-credentials";

/// 后端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Token 表名
    pub token_table: String,

    /// AWS 区域（为空时使用 SDK 默认的区域解析）
    pub aws_region: Option<String>,

    /// 保存 Google OAuth2 客户端凭据 JSON 的参数名
    pub google_credentials_parameter: String,

    /// 读取 Google 凭据时是否要求解密
    pub google_credentials_decrypt: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token_table: DEFAULT_TOKEN_TABLE.to_string(),
            aws_region: None,
            google_credentials_parameter: DEFAULT_GOOGLE_CREDENTIALS_PARAMETER.to_string(),
            google_credentials_decrypt: true,
        }
    }
}

impl AppConfig {
    /// 加载配置
    ///
    /// 优先级（从高到低）：
    /// 1. 环境变量：`MAILBRIDGE_TOKEN_TABLE`, `MAILBRIDGE_AWS_REGION`,
    ///    `MAILBRIDGE_GOOGLE_CREDENTIALS_PARAMETER`
    /// 2. 配置文件：`MAILBRIDGE_CONFIG` 指定的路径，或配置目录下的 `mailbridge/config.toml`
    /// 3. 默认值
    ///
    /// 配置文件不存在时不报错
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                tracing::info!("✅ 从配置文件加载配置: {}", path.display());
                Self::load_from_file(&path)?
            }
            _ => {
                tracing::debug!("配置文件不存在，使用默认配置");
                Self::default()
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// 从指定 TOML 文件加载
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;

        Self::from_toml(&content).with_context(|| format!("配置文件格式错误: {}", path.display()))
    }

    /// 解析 TOML 内容，缺失的字段使用默认值
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖配置
    fn apply_env(&mut self) {
        if let Ok(table) = std::env::var("MAILBRIDGE_TOKEN_TABLE") {
            self.token_table = table;
        }
        if let Ok(region) = std::env::var("MAILBRIDGE_AWS_REGION") {
            self.aws_region = Some(region);
        }
        if let Ok(parameter) = std::env::var("MAILBRIDGE_GOOGLE_CREDENTIALS_PARAMETER") {
            self.google_credentials_parameter = parameter;
        }
    }
}

/// 获取配置文件路径
///
/// `MAILBRIDGE_CONFIG` 优先，否则为 `<配置目录>/mailbridge/config.toml`
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("MAILBRIDGE_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|dir| dir.join("mailbridge").join("config.toml"))
}
