//! User Context - Aggregate Root

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, PasskeyCredential, Role, SecondFactor, UserError, UserId, Username};

/// User 聚合根
///
/// 不变量:
/// - passkey_enabled 为真时至少有一个凭证
/// - pending_token 只在二次验证流程中存在，且总是带过期时间
/// - password_hash 永远不会出现在 public_view 中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub email_verified: bool,
    pub totp_enabled: bool,
    pub totp_secret: Option<String>,
    pub passkey_enabled: bool,
    pub passkey_credentials: Vec<PasskeyCredential>,
    pub passkey_verified: bool,
    pub verified: bool,
    pub pending_token: Option<String>,
    pub pending_token_expires_at: Option<DateTime<Utc>>,
    pub daily_usage: u32,
    pub usage_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// 对外展示的用户信息（不含密码和密钥）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
    pub totp_enabled: bool,
    pub passkey_enabled: bool,
    pub passkey_verified: bool,
    pub verified: bool,
    pub created_at: String,
}

impl User {
    /// 创建新用户
    pub fn new(username: Username, email: Email, password_hash: String, role: Role) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            role,
            email_verified: false,
            totp_enabled: false,
            totp_secret: None,
            passkey_enabled: false,
            passkey_credentials: Vec::new(),
            passkey_verified: false,
            verified: false,
            pending_token: None,
            pending_token_expires_at: None,
            daily_usage: 0,
            usage_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_totp(&self) -> bool {
        self.totp_enabled
    }

    pub fn has_passkey(&self) -> bool {
        !self.passkey_credentials.is_empty()
    }

    /// 已启用的二次验证方式（TOTP 在前）
    pub fn second_factors(&self) -> Vec<SecondFactor> {
        let mut factors = Vec::new();
        if self.has_totp() {
            factors.push(SecondFactor::Totp);
        }
        if self.has_passkey() {
            factors.push(SecondFactor::Passkey);
        }
        factors
    }

    pub fn requires_second_factor(&self) -> bool {
        self.has_totp() || self.has_passkey()
    }

    /// 写入二次验证临时令牌
    pub fn set_pending_token(&mut self, token: String, ttl: Duration, now: DateTime<Utc>) {
        self.pending_token = Some(token);
        self.pending_token_expires_at = Some(now + ttl);
    }

    pub fn clear_pending_token(&mut self) {
        self.pending_token = None;
        self.pending_token_expires_at = None;
    }

    pub fn pending_token_valid(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.pending_token, self.pending_token_expires_at) {
            (Some(pending), Some(expires_at)) => pending == token && now <= expires_at,
            _ => false,
        }
    }

    pub fn find_passkey(&self, credential_id: &str) -> Option<&PasskeyCredential> {
        self.passkey_credentials
            .iter()
            .find(|c| c.credential_id == credential_id)
    }

    pub fn add_passkey(&mut self, credential: PasskeyCredential) -> Result<(), UserError> {
        if self.find_passkey(&credential.credential_id).is_some() {
            return Err(UserError::DuplicatePasskey(credential.credential_id));
        }
        self.passkey_credentials.push(credential);
        self.passkey_enabled = true;
        Ok(())
    }

    pub fn remove_passkey(&mut self, credential_id: &str) -> Result<(), UserError> {
        let before = self.passkey_credentials.len();
        self.passkey_credentials
            .retain(|c| c.credential_id != credential_id);
        if self.passkey_credentials.len() == before {
            return Err(UserError::PasskeyNotFound(credential_id.to_string()));
        }
        if self.passkey_credentials.is_empty() {
            self.passkey_enabled = false;
            self.passkey_verified = false;
        }
        Ok(())
    }

    pub fn enable_totp(&mut self, secret: String) {
        self.totp_secret = Some(secret);
        self.totp_enabled = true;
    }

    pub fn disable_totp(&mut self) {
        self.totp_secret = None;
        self.totp_enabled = false;
    }

    /// 今日剩余合成次数，管理员不限（None）
    pub fn remaining_usage(&self, daily_limit: u32, today: NaiveDate) -> Option<u32> {
        if self.is_admin() {
            return None;
        }
        Some(daily_limit.saturating_sub(self.used_on(today)))
    }

    /// 记录一次合成调用，跨日自动清零
    pub fn record_usage(&mut self, today: NaiveDate) {
        if self.usage_date != Some(today) {
            self.usage_date = Some(today);
            self.daily_usage = 0;
        }
        self.daily_usage += 1;
    }

    fn used_on(&self, today: NaiveDate) -> u32 {
        if self.usage_date == Some(today) {
            self.daily_usage
        } else {
            0
        }
    }

    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id.to_string(),
            username: self.username.to_string(),
            email: self.email.to_string(),
            role: self.role,
            email_verified: self.email_verified,
            totp_enabled: self.totp_enabled,
            passkey_enabled: self.passkey_enabled,
            passkey_verified: self.passkey_verified,
            verified: self.verified,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
