//! Email Sender Port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Email service rejected the message: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// 待发送的邮件
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait EmailSenderPort: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}
