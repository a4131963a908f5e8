/// 邮件正文提取
///
/// 按顺序遍历邮件的 MIME 部分，返回第一个匹配类型的解码正文
use base64::DecodeError;

use crate::mail::gmail::types::MessagePart;
use crate::utils::base64::base64_decode;

/// 纯文本正文的 MIME 类型
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// HTML 正文的 MIME 类型
pub const MIME_TEXT_HTML: &str = "text/html";

/// 提取纯文本正文
///
/// # Arguments
/// * `parts` - 邮件的 MIME 部分（有序列表用 `&parts`，键值集合用 `map.values()`）
///
/// # Returns
/// 第一个 `text/plain` 部分的解码内容；不存在时返回 `None`
///
/// # Errors
/// 匹配部分的 Base64 数据无效
pub fn get_email_body_text<'a, I>(parts: I) -> Result<Option<String>, DecodeError>
where
    I: IntoIterator<Item = &'a MessagePart>,
{
    find_body(parts, MIME_TEXT_PLAIN)
}

/// 提取 HTML 正文
///
/// 与 [`get_email_body_text`] 相同，只是匹配 `text/html`
pub fn get_email_body_html<'a, I>(parts: I) -> Result<Option<String>, DecodeError>
where
    I: IntoIterator<Item = &'a MessagePart>,
{
    find_body(parts, MIME_TEXT_HTML)
}

fn find_body<'a, I>(parts: I, mime_type: &str) -> Result<Option<String>, DecodeError>
where
    I: IntoIterator<Item = &'a MessagePart>,
{
    // MIME 类型必须完全相同（不处理 `text/plain; charset=...` 之类的变体）
    match parts.into_iter().find(|part| part.mime_type == mime_type) {
        Some(part) => base64_decode(&part.body.data).map(Some),
        None => Ok(None),
    }
}
