//! User Query Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::UserRepositoryPort;
use crate::application::queries::{GetCurrentUser, ListPasskeys};
use crate::domain::user::{PasskeyCredential, PublicUser};

/// 当前用户资料 + 今日剩余次数（管理员为 None）
#[derive(Debug, Clone)]
pub struct CurrentUserResponse {
    pub user: PublicUser,
    pub remaining_usage: Option<u32>,
}

/// GetCurrentUser Handler
pub struct GetCurrentUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    daily_limit: u32,
}

impl GetCurrentUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, daily_limit: u32) -> Self {
        Self {
            user_repo,
            daily_limit,
        }
    }

    pub async fn handle(&self, query: GetCurrentUser) -> Result<CurrentUserResponse, ApplicationError> {
        let user = self
            .user_repo
            .find_by_id(&query.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("用户不存在"))?;

        Ok(CurrentUserResponse {
            remaining_usage: user.remaining_usage(self.daily_limit, Utc::now().date_naive()),
            user: user.public_view(),
        })
    }
}

/// ListPasskeys Handler
pub struct ListPasskeysHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl ListPasskeysHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(
        &self,
        query: ListPasskeys,
    ) -> Result<Vec<PasskeyCredential>, ApplicationError> {
        let user = self
            .user_repo
            .find_by_id(&query.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("用户不存在"))?;
        Ok(user.passkey_credentials)
    }
}
