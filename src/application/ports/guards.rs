//! 内存态守卫端口：验证码暂存、限流
//!
//! 实现在 infrastructure/memory 层

use std::time::Duration;

/// 邮箱验证码暂存
pub trait VerificationCodeStorePort: Send + Sync {
    /// 写入（覆盖）验证码
    fn put(&self, email: &str, code: String, ttl: Duration);

    /// 取出未过期的验证码，过期条目顺带清除
    fn get(&self, email: &str) -> Option<String>;

    fn remove(&self, email: &str);
}

/// 滑动窗口限流器
pub trait RateLimiterPort: Send + Sync {
    /// 记录一次请求，超出窗口配额时返回 false（超限请求不计数）
    fn try_acquire(&self, key: &str) -> bool;
}
