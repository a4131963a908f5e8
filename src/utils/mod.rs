/// 通用工具
pub mod base64;
