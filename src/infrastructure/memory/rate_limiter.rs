//! Sliding Window Rate Limiter

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::application::ports::RateLimiterPort;

/// 按 key 的滑动窗口限流器
///
/// 每个 key 保留窗口内已放行请求的时间戳
pub struct SlidingWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    hits: DashMap<String, VecDeque<Instant>>,
}

impl SlidingWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: DashMap::new(),
        }
    }

    /// 移除窗口内已无请求的 key
    pub fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.hits.len();
        self.hits.retain(|_, hits| {
            hits.back()
                .map_or(false, |last| now.duration_since(*last) < self.window)
        });
        before - self.hits.len()
    }
}

impl RateLimiterPort for SlidingWindowRateLimiter {
    fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.entry(key.to_string()).or_default();

        while let Some(oldest) = hits.front() {
            if now.duration_since(*oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        if hits.len() >= self.max_requests as usize {
            tracing::debug!(key = %key, max = self.max_requests, "Rate limit hit");
            return false;
        }

        hits.push_back(now);
        true
    }
}
