//! User Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已注册的 Passkey 凭证
///
/// 只保存凭证 ID 与展示名称，WebAuthn 断言校验由客户端库完成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyCredential {
    #[serde(rename = "credentialID")]
    pub credential_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl PasskeyCredential {
    pub fn new(credential_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            credential_id: credential_id.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// 日志中使用的截断 ID
    pub fn short_id(credential_id: &str) -> String {
        let prefix: String = credential_id.chars().take(10).collect();
        format!("{}...", prefix)
    }
}
