//! Email Adapter - 验证码邮件发送

mod http_email_sender;
mod logging_email_sender;

pub use http_email_sender::{HttpEmailSender, HttpEmailSenderConfig};
pub use logging_email_sender::{LoggingEmailSender, RecordingEmailSender};
