/// Gmail 模块 - Token 刷新与邮件正文提取
pub mod body;
pub mod oauth;
pub mod token;
pub mod types;

// 重新导出常用类型和函数
pub use body::{get_email_body_html, get_email_body_text};
pub use oauth::{GoogleOAuthClient, IdentityClient};
pub use token::TokenRefresher;
pub use types::{Credentials, MessagePart, MessagePartBody, TokenSet};
