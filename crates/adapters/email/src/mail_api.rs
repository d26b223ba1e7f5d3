//! 第三方模板邮件 HTTP 接口

use crate::EmailSender;
use secrecy::ExposeSecret;
use serde::Serialize;
use shiroha_config::MailApiConfig;
use shiroha_errors::{AppError, AppResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 请求体，`data` 为模板变量序列化后的 JSON 字符串
#[derive(Debug, Clone, Serialize)]
pub struct MailApiRequest {
    pub app_key: String,
    pub template_id: String,
    pub to: String,
    pub data: String,
}

/// 模板邮件 HTTP 客户端
pub struct MailApiClient {
    http: reqwest::Client,
    config: MailApiConfig,
}

impl MailApiClient {
    pub fn new(config: MailApiConfig, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn build_request(
        &self,
        to: &str,
        template_id: &str,
        context: &serde_json::Value,
    ) -> AppResult<MailApiRequest> {
        let data = serde_json::to_string(context)
            .map_err(|e| AppError::internal(format!("Failed to encode template data: {}", e)))?;

        Ok(MailApiRequest {
            app_key: self.config.app_key.expose_secret().clone(),
            template_id: template_id.to_string(),
            to: to.to_string(),
            data,
        })
    }
}

#[async_trait::async_trait]
impl EmailSender for MailApiClient {
    async fn send_template_email(
        &self,
        to: &str,
        _subject: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> AppResult<()> {
        debug!(to = %to, template = %template, "Sending template email via mail API");

        let body = self.build_request(to, template, context)?;

        let response = self
            .http
            .post(&self.config.request_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Mail API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, detail = %detail, "Mail API rejected request");
            return Err(AppError::external_service(format!(
                "Mail API returned {}: {}",
                status, detail
            )));
        }

        info!(to = %to, template = %template, "Template email sent successfully");
        Ok(())
    }
}
