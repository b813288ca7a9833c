//! LogShare Queries

/// 列出全部分享（管理员 bearer 令牌）
#[derive(Debug, Clone)]
pub struct ListShareLogs {
    pub authorization: Option<String>,
    pub client_ip: String,
}

/// 按 ID 查询分享内容（管理员密码）
#[derive(Debug, Clone)]
pub struct QueryShareLog {
    pub id: String,
    pub admin_password: Option<String>,
    pub client_ip: String,
}
