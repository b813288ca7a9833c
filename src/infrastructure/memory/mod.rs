//! Memory Layer - In-Memory State Management
//!
//! 邮箱验证码暂存与限流窗口，均为进程内状态

mod rate_limiter;
mod verification_codes;

pub use rate_limiter::SlidingWindowRateLimiter;
pub use verification_codes::InMemoryVerificationCodeStore;
