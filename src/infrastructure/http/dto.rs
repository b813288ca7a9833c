//! Data Transfer Objects
//!
//! 线上字段一律 camelCase

use serde::{Deserialize, Serialize};

use crate::domain::user::{PasskeyCredential, PublicUser, Role, SecondFactor, User};

/// 通用成功响应
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ============================================================================
// Auth DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub need_verify: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// 登录响应中的用户摘要
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for LoginUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
    #[serde(rename = "requires2FA", skip_serializing_if = "Option::is_none")]
    pub requires_2fa: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_type: Option<Vec<SecondFactor>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub remaining_usage: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyVerifyRequest {
    pub username: Option<String>,
    pub passkey_credential_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PasskeyUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PasskeyVerifyResponse {
    pub success: bool,
    pub token: String,
    pub user: PasskeyUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyUserRequest {
    pub user_id: Option<String>,
    pub verification_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

// ============================================================================
// Two-factor DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpSetupResponse {
    pub secret: String,
    pub otpauth_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotpTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPasskeyRequest {
    pub credential_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePasskeyRequest {
    pub credential_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PasskeyListResponse {
    pub credentials: Vec<PasskeyCredential>,
}

#[derive(Debug, Serialize)]
pub struct PasskeyRegisteredResponse {
    pub success: bool,
    pub credential: PasskeyCredential,
}

// ============================================================================
// LogShare DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryShareLogRequest {
    pub admin_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadShareLogResponse {
    pub id: String,
    pub link: String,
    pub ext: String,
}

// ============================================================================
// TTS DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpeechRequest {
    #[serde(default)]
    pub text: String,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub output_format: Option<String>,
    pub speed: Option<f32>,
    pub custom_file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpeechResponse {
    pub file_name: String,
    pub audio_url: String,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Email, Username};

    #[test]
    fn test_login_response_shape() {
        let user = User::new(
            Username::new("amy").unwrap(),
            Email::from_trusted("amy@gmail.com"),
            "hash".to_string(),
            Role::User,
        );
        let plain = LoginResponse {
            user: LoginUser::from(&user),
            token: "jwt".to_string(),
            requires_2fa: None,
            two_factor_type: None,
        };
        let json = serde_json::to_value(&plain).unwrap();
        assert_eq!(json["user"]["role"], "user");
        assert!(json.get("requires2FA").is_none());

        let pending = LoginResponse {
            user: LoginUser::from(&user),
            token: "tmp".to_string(),
            requires_2fa: Some(true),
            two_factor_type: Some(vec![SecondFactor::Totp, SecondFactor::Passkey]),
        };
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json["requires2FA"], true);
        assert_eq!(json["twoFactorType"], serde_json::json!(["TOTP", "Passkey"]));
    }

    #[test]
    fn test_speech_request_defaults() {
        let req: GenerateSpeechRequest =
            serde_json::from_str(r#"{"outputFormat": "flac", "customFileName": "a"}"#).unwrap();
        assert_eq!(req.text, "");
        assert_eq!(req.output_format.as_deref(), Some("flac"));
        assert!(req.model.is_none());
    }
}
