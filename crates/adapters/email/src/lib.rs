//! Email 适配器
//!
//! 两种发送方式：
//! - 第三方模板邮件 HTTP 接口（[`MailApiClient`]）
//! - SMTP + 本地 tera 模板（[`SmtpEmailClient`]）

mod mail_api;
mod smtp;
mod template;

pub use mail_api::{MailApiClient, MailApiRequest};
pub use smtp::{EmailMessage, SmtpEmailClient};
pub use template::EmailTemplate;

use shiroha_errors::AppResult;

/// 邮件发送接口
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送模板邮件
    ///
    /// `template` 的含义由实现决定：HTTP 接口为模板 ID，SMTP 为模板文件名
    async fn send_template_email(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> AppResult<()>;
}
