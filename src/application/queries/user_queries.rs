//! User Queries

/// 当前登录用户
#[derive(Debug, Clone)]
pub struct GetCurrentUser {
    pub user_id: String,
}

/// 列出当前用户的 Passkey 凭证
#[derive(Debug, Clone)]
pub struct ListPasskeys {
    pub user_id: String,
}
