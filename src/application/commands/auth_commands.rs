//! Auth Commands

/// 注册
#[derive(Debug, Clone, Default)]
pub struct Register {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 邮箱验证码校验
#[derive(Debug, Clone, Default)]
pub struct VerifyEmail {
    pub email: Option<String>,
    pub code: Option<String>,
}

/// 登录（用户名或邮箱）
#[derive(Debug, Clone, Default)]
pub struct Login {
    pub identifier: Option<String>,
    pub password: Option<String>,
    pub client_ip: String,
}

/// Passkey 二次校验
#[derive(Debug, Clone, Default)]
pub struct PasskeyVerify {
    pub username: Option<String>,
    pub credential_id: Option<String>,
}

/// 二次验证（TOTP 码或 Passkey 凭证 ID）
#[derive(Debug, Clone, Default)]
pub struct VerifyUser {
    pub user_id: Option<String>,
    pub verification_code: Option<String>,
}

/// 登出，清除与 bearer 值相同的临时令牌
#[derive(Debug, Clone, Default)]
pub struct Logout {
    pub bearer: Option<String>,
}
