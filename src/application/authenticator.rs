//! Bearer 令牌认证
//!
//! 解析 `Authorization: Bearer <jwt>`，返回令牌对应的用户

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::UserRepositoryPort;
use crate::application::security::TokenService;
use crate::domain::user::User;

/// 已认证的请求主体
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// 原始 bearer 令牌（日志列表用作加密密钥）
    pub token: String,
}

/// 从 Authorization 头取出 bearer 令牌
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub struct Authenticator {
    user_repo: Arc<dyn UserRepositoryPort>,
    tokens: Arc<TokenService>,
}

impl Authenticator {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    /// 认证 Authorization 头
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthContext, ApplicationError> {
        let header = authorization
            .filter(|h| h.starts_with("Bearer "))
            .ok_or_else(|| ApplicationError::unauthorized("未登录"))?;
        let token = bearer_token(Some(header))
            .ok_or_else(|| ApplicationError::unauthorized("无效的认证令牌"))?;

        let claims = self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            ApplicationError::unauthorized("认证令牌无效")
        })?;

        let user = self
            .user_repo
            .find_by_id(&claims.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %claims.user_id, "Token refers to unknown user");
                ApplicationError::not_found("用户不存在")
            })?;

        Ok(AuthContext {
            user,
            token: token.to_string(),
        })
    }

    /// 认证并要求管理员角色
    pub async fn authenticate_admin(
        &self,
        authorization: Option<&str>,
    ) -> Result<AuthContext, ApplicationError> {
        let ctx = self.authenticate(authorization).await?;
        if !ctx.user.is_admin() {
            return Err(ApplicationError::forbidden("需要管理员权限"));
        }
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
