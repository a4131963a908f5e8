/// Base64 解码工具
///
/// Gmail API 返回的邮件正文使用 URL-safe Base64（通常无填充），
/// 这里统一接受标准字母表和 URL-safe 字母表，填充可有可无
use base64::{
    DecodeError, Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

/// 宽松解码器：标准字母表，填充可选，允许末尾多余比特
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// 将 Base64 字符串解码为 UTF-8 文本
///
/// - 忽略 ASCII 空白（MIME 正文常按 76 列换行）
/// - `-` / `_` 视为 `+` / `/`
/// - 无效的 UTF-8 字节序列替换为 U+FFFD
///
/// # Errors
/// 输入不是合法的 Base64 时返回 [`DecodeError`]
///
/// # Example
/// ```
/// let text = mailbridge::base64_decode("aGk=").unwrap();
/// assert_eq!(text, "hi");
/// ```
pub fn base64_decode(value: &str) -> Result<String, DecodeError> {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = LENIENT.decode(normalized)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
