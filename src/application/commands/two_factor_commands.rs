//! Two-Factor Management Commands
//!
//! 均作用于已认证用户

/// 生成新的 TOTP 密钥（尚未启用）
#[derive(Debug, Clone)]
pub struct SetupTotp {
    pub user_id: String,
}

/// 用一次验证码确认并启用 TOTP
#[derive(Debug, Clone)]
pub struct EnableTotp {
    pub user_id: String,
    pub token: Option<String>,
}

/// 用一次验证码确认并关闭 TOTP
#[derive(Debug, Clone)]
pub struct DisableTotp {
    pub user_id: String,
    pub token: Option<String>,
}

/// 登记 Passkey 凭证
#[derive(Debug, Clone)]
pub struct RegisterPasskey {
    pub user_id: String,
    pub credential_id: Option<String>,
    pub name: Option<String>,
}

/// 移除 Passkey 凭证
#[derive(Debug, Clone)]
pub struct RemovePasskey {
    pub user_id: String,
    pub credential_id: Option<String>,
}
