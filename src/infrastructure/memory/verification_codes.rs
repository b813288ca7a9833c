//! In-Memory Verification Code Store

use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::application::ports::VerificationCodeStorePort;

struct PendingCode {
    code: String,
    expires_at: Instant,
}

/// 内存验证码暂存，进程重启即失效
pub struct InMemoryVerificationCodeStore {
    codes: DashMap<String, PendingCode>,
}

impl InMemoryVerificationCodeStore {
    pub fn new() -> Self {
        Self {
            codes: DashMap::new(),
        }
    }

    /// 清理过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.codes.len();
        self.codes.retain(|_, pending| pending.expires_at > now);
        before - self.codes.len()
    }
}

impl Default for InMemoryVerificationCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationCodeStorePort for InMemoryVerificationCodeStore {
    fn put(&self, email: &str, code: String, ttl: Duration) {
        self.codes.insert(
            email.to_string(),
            PendingCode {
                code,
                expires_at: Instant::now() + ttl,
            },
        );
        tracing::debug!(email = %email, ttl_secs = ttl.as_secs(), "Verification code stored");
    }

    fn get(&self, email: &str) -> Option<String> {
        let expired = match self.codes.get(email) {
            Some(pending) if pending.expires_at > Instant::now() => {
                return Some(pending.code.clone())
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.codes.remove(email);
            tracing::debug!(email = %email, "Verification code expired");
        }
        None
    }

    fn remove(&self, email: &str) {
        self.codes.remove(email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let store = InMemoryVerificationCodeStore::new();
        store.put("a@gmail.com", "ABCD1234".to_string(), Duration::from_secs(60));
        assert_eq!(store.get("a@gmail.com").as_deref(), Some("ABCD1234"));

        store.put("a@gmail.com", "NEWCODE1".to_string(), Duration::from_secs(60));
        assert_eq!(store.get("a@gmail.com").as_deref(), Some("NEWCODE1"));

        store.remove("a@gmail.com");
        assert!(store.get("a@gmail.com").is_none());
    }

    #[test]
    fn test_expired_code_is_dropped() {
        let store = InMemoryVerificationCodeStore::new();
        store.put("b@gmail.com", "X".to_string(), Duration::ZERO);
        assert!(store.get("b@gmail.com").is_none());
        assert_eq!(store.codes.len(), 0);

        store.put("c@gmail.com", "Y".to_string(), Duration::ZERO);
        store.put("d@gmail.com", "Z".to_string(), Duration::from_secs(60));
        assert_eq!(store.purge_expired(), 1);
    }
}
