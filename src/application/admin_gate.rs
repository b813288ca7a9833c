//! LogShare 访问闸门
//!
//! 三个 LogShare 接口共用：按客户端 IP 限流 + 管理员密码校验

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{RateLimiterPort, UserRepositoryPort};
use crate::application::security::verify_password;

pub const RATE_LIMITED: &str = "请求过于频繁，请稍后再试";
pub const BAD_ADMIN_PASSWORD: &str = "管理员密码错误";

pub struct AdminGate {
    limiter: Arc<dyn RateLimiterPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl AdminGate {
    pub fn new(limiter: Arc<dyn RateLimiterPort>, user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { limiter, user_repo }
    }

    /// 计入一次请求，超限返回 429
    pub fn throttle(&self, operation: &str, client_ip: &str) -> Result<(), ApplicationError> {
        if self.limiter.try_acquire(client_ip) {
            return Ok(());
        }
        tracing::warn!(
            operation = %operation,
            ip = %client_ip,
            result = "rejected",
            reason = "rate_limited",
            "LogShare request throttled"
        );
        Err(ApplicationError::too_many_requests(RATE_LIMITED))
    }

    /// 密码与任一管理员账号匹配即通过
    pub async fn is_admin_password(&self, password: &str) -> Result<bool, ApplicationError> {
        let admins = self.user_repo.find_admins().await?;
        Ok(admins
            .iter()
            .any(|admin| verify_password(password, &admin.password_hash)))
    }
}
