//! HTTP Email Sender - 调用 Resend 风格的邮件 API
//!
//! POST {api_url}
//! Authorization: Bearer <api_key>
//! Request: {"from": "...", "to": ["..."], "subject": "...", "html": "...", "text": "..."}

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{EmailError, EmailMessage, EmailSenderPort};
use crate::config::EmailConfig;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpEmailSenderConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub timeout_secs: u64,
}

impl From<&EmailConfig> for HttpEmailSenderConfig {
    fn from(config: &EmailConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            timeout_secs: 15,
        }
    }
}

/// HTTP 邮件发送器
pub struct HttpEmailSender {
    client: Client,
    config: HttpEmailSenderConfig,
}

impl HttpEmailSender {
    pub fn new(config: HttpEmailSenderConfig) -> Result<Self, EmailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmailError::DeliveryFailed(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl EmailSenderPort for HttpEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let body = SendEmailRequest {
            from: &self.config.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::DeliveryFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}
