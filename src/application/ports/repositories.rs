//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::logshare::{ShareFileId, ShareTextRecord};
use crate::domain::user::User;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// User Repository
// ============================================================================

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 新建用户，用户名或邮箱冲突时返回 Duplicate
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    /// 整体覆盖更新
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// 按用户名或邮箱查找（登录）
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, RepositoryError>;

    /// 按待验证临时令牌查找
    async fn find_by_pending_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;

    /// 用户名或邮箱是否已被占用
    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, RepositoryError>;

    /// 所有管理员
    async fn find_admins(&self) -> Result<Vec<User>, RepositoryError>;
}

// ============================================================================
// Share Text Repository
// ============================================================================

/// 文本类日志分享的持久化
#[async_trait]
pub trait ShareTextRepositoryPort: Send + Sync {
    async fn save(&self, record: &ShareTextRecord) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, file_id: &ShareFileId)
        -> Result<Option<ShareTextRecord>, RepositoryError>;

    /// 全部记录，按创建时间倒序
    async fn find_all(&self) -> Result<Vec<ShareTextRecord>, RepositoryError>;
}
