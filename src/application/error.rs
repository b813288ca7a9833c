//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。消息文本直接返回给客户端。

use thiserror::Error;

use crate::application::ports::{
    AudioStorageError, BlobStorageError, RepositoryError, TtsError,
};
use crate::application::security::{CipherError, PasswordError, TokenError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{0}")]
    NotFound(String),

    /// 验证错误
    #[error("{0}")]
    ValidationError(String),

    /// 未认证或凭证错误
    #[error("{0}")]
    Unauthorized(String),

    /// 权限不足
    #[error("{0}")]
    Forbidden(String),

    /// 触发限流
    #[error("{0}")]
    TooManyRequests(String),

    /// 资源冲突
    #[error("{0}")]
    Conflict(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 外部服务错误
    #[error("{0}")]
    ExternalServiceError(String),

    /// 存储错误
    #[error("{0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::TooManyRequests(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<BlobStorageError> for ApplicationError {
    fn from(err: BlobStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<AudioStorageError> for ApplicationError {
    fn from(err: AudioStorageError) -> Self {
        match err {
            AudioStorageError::FileNotFound(name) => Self::NotFound(format!("音频文件不存在: {}", name)),
            AudioStorageError::InvalidName(name) => Self::ValidationError(format!("无效的文件名: {}", name)),
            AudioStorageError::IoError(msg) => Self::StorageError(msg),
        }
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<CipherError> for ApplicationError {
    fn from(err: CipherError) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<PasswordError> for ApplicationError {
    fn from(err: PasswordError) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<TokenError> for ApplicationError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => Self::InternalError(msg),
            _ => Self::Unauthorized("认证令牌无效".to_string()),
        }
    }
}
