//! SMTP 邮件客户端

use crate::{EmailSender, EmailTemplate};
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use shiroha_config::SmtpConfig;
use shiroha_errors::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 邮件消息
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// SMTP 邮件客户端
pub struct SmtpEmailClient {
    config: SmtpConfig,
    template: Arc<EmailTemplate>,
}

impl SmtpEmailClient {
    pub fn new(config: SmtpConfig, template: EmailTemplate) -> Self {
        Self {
            config,
            template: Arc::new(template),
        }
    }

    /// 从配置中的模板目录加载模板
    pub fn from_config(config: SmtpConfig) -> AppResult<Self> {
        let template = EmailTemplate::new(&config.template_dir)?;
        Ok(Self::new(config, template))
    }

    fn build_transport(&self) -> AppResult<SmtpTransport> {
        // use_tls=false 用于本地开发的明文中继
        let builder = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host).map_err(|e| {
                AppError::internal(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        };

        let mut builder = builder
            .port(self.config.smtp_port)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)));

        // 用户名为空时不做 SMTP AUTH
        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.expose_secret().clone(),
            ));
        }

        Ok(builder.build())
    }

    fn build_message(&self, msg: &EmailMessage) -> AppResult<Message> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid from address: {}", e)))?;

        let to = msg
            .to
            .parse()
            .map_err(|e| AppError::validation(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&msg.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(msg.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(msg.html_body.clone()),
                    ),
            )
            .map_err(|e| AppError::internal(format!("Failed to build message: {}", e)))
    }

    /// 渲染 `template` 及其 `.txt` 纯文本版本
    fn compose(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> AppResult<EmailMessage> {
        let (html_body, text_body) = self.template.render_with_text(template, context)?;

        Ok(EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body,
            text_body,
        })
    }

    async fn send_message(&self, message: Message) -> AppResult<()> {
        let transport = self.build_transport()?;

        // lettre 的 SmtpTransport 是同步的
        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| AppError::external_service(format!("Failed to send email: {}", e)))
        })
        .await
        .map_err(|e| AppError::internal(format!("Task join error: {}", e)))??;

        Ok(())
    }
}

#[async_trait::async_trait]
impl EmailSender for SmtpEmailClient {
    async fn send_template_email(
        &self,
        to: &str,
        subject: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> AppResult<()> {
        debug!(to = %to, subject = %subject, template = %template, "Sending template email via SMTP");

        let msg = self.compose(to, subject, template, context)?;
        let message = self.build_message(&msg)?;
        self.send_message(message).await?;

        info!(to = %to, template = %template, "Template email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> SmtpEmailClient {
        let config = SmtpConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "user@example.com".to_string(),
            password: secrecy::Secret::new("password".to_string()),
            from_email: "noreply@example.com".to_string(),
            from_name: "Shiroha".to_string(),
            use_tls: true,
            timeout_secs: 30,
            template_dir: "templates".to_string(),
        };
        let mut templates = HashMap::new();
        templates.insert(
            "verify.html".to_string(),
            "<a href=\"{{ verify_url }}\">verify</a>".to_string(),
        );
        templates.insert(
            "verify.txt".to_string(),
            "Verify your address: {{ verify_url }}".to_string(),
        );
        SmtpEmailClient::new(config, EmailTemplate::from_strings(templates).unwrap())
    }

    #[test]
    fn test_build_message() {
        let msg = EmailMessage {
            to: "test@example.com".to_string(),
            subject: "Test Subject".to_string(),
            html_body: "<h1>Test</h1>".to_string(),
            text_body: "Test".to_string(),
        };

        assert!(client().build_message(&msg).is_ok());
    }

    #[test]
    fn test_invalid_recipient() {
        let msg = EmailMessage {
            to: "not an address".to_string(),
            subject: "Test".to_string(),
            html_body: String::new(),
            text_body: String::new(),
        };

        let err = client().build_message(&msg).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_compose_renders_both_parts() {
        let context = serde_json::json!({
            "uid": "u-1",
            "email": "alice@example.com",
            "verify_url": "http://api.example.com/auth/verify?uid=u-1&x=1"
        });

        let msg = client()
            .compose("alice@example.com", "Verify", "verify.html", &context)
            .unwrap();

        assert_eq!(
            msg.text_body,
            "Verify your address: http://api.example.com/auth/verify?uid=u-1&x=1"
        );
        assert!(msg.html_body.starts_with("<a href=\"http:&#x2F;&#x2F;api.example.com"));
        assert!(client().build_message(&msg).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_sending() {
        let err = client()
            .send_template_email("a@example.com", "s", "missing.html", &serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 500);
    }
}
