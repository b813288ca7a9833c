//! 不真正投递的邮件发送器

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{EmailError, EmailMessage, EmailSenderPort};

/// 只写日志，邮件服务未启用时使用
#[derive(Debug, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSenderPort for LoggingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        // 正文含验证码，不写日志
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery disabled, message dropped"
        );
        Ok(())
    }
}

/// 测试用：记录所有发出的邮件
#[derive(Debug, Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailSenderPort for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent
            .lock()
            .map_err(|e| EmailError::DeliveryFailed(e.to_string()))?
            .push(message);
        Ok(())
    }
}
