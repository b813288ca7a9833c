//! User Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("无效的用户名: {0}")]
    InvalidUsername(String),

    #[error("只支持主流邮箱（如gmail、outlook、qq、163、126、hotmail、yahoo、icloud、foxmail等）")]
    UnsupportedEmailDomain,

    #[error("{0}")]
    InvalidEmail(String),

    #[error("Passkey 凭证已存在: {0}")]
    DuplicatePasskey(String),

    #[error("Passkey 凭证不存在: {0}")]
    PasskeyNotFound(String),
}
