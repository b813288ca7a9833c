//! Two-Factor Management Handlers
//!
//! TOTP 启停与 Passkey 凭证登记

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::{
    DisableTotp, EnableTotp, RegisterPasskey, RemovePasskey, SetupTotp,
};
use crate::application::error::ApplicationError;
use crate::application::ports::UserRepositoryPort;
use crate::application::security::totp;
use crate::domain::user::{PasskeyCredential, User, UserError};

/// provisioning URI 中的 issuer
pub const TOTP_ISSUER: &str = "Happy-TTS";

async fn load_user(
    repo: &Arc<dyn UserRepositoryPort>,
    user_id: &str,
) -> Result<User, ApplicationError> {
    repo.find_by_id(user_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("用户不存在"))
}

fn check_code(secret: &str, code: Option<&str>) -> Result<(), ApplicationError> {
    let code = code
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApplicationError::validation("请提供验证码"))?;
    let ok = totp::verify_code(secret, code, Utc::now().timestamp())
        .map_err(|e| ApplicationError::internal(e.to_string()))?;
    if !ok {
        return Err(ApplicationError::unauthorized("验证码错误"));
    }
    Ok(())
}

// ============================================================================
// TOTP
// ============================================================================

#[derive(Debug, Clone)]
pub struct TotpSetupResponse {
    pub secret: String,
    pub otpauth_url: String,
}

/// SetupTotp Handler
pub struct SetupTotpHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl SetupTotpHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: SetupTotp) -> Result<TotpSetupResponse, ApplicationError> {
        let mut user = load_user(&self.user_repo, &command.user_id).await?;
        if user.totp_enabled {
            return Err(ApplicationError::validation("TOTP已启用"));
        }

        let secret = totp::generate_secret();
        let otpauth_url = totp::provisioning_uri(TOTP_ISSUER, user.username.as_str(), &secret)
            .map_err(|e| ApplicationError::internal(e.to_string()))?;

        user.totp_secret = Some(secret.clone());
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "TOTP secret generated");
        Ok(TotpSetupResponse {
            secret,
            otpauth_url,
        })
    }
}

/// EnableTotp Handler
pub struct EnableTotpHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl EnableTotpHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: EnableTotp) -> Result<(), ApplicationError> {
        let mut user = load_user(&self.user_repo, &command.user_id).await?;
        if user.totp_enabled {
            return Err(ApplicationError::validation("TOTP已启用"));
        }
        let secret = user
            .totp_secret
            .clone()
            .ok_or_else(|| ApplicationError::validation("请先生成TOTP密钥"))?;

        check_code(&secret, command.token.as_deref())?;

        user.enable_totp(secret);
        self.user_repo.update(&user).await?;
        tracing::info!(user_id = %user.id, "TOTP enabled");
        Ok(())
    }
}

/// DisableTotp Handler
pub struct DisableTotpHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl DisableTotpHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: DisableTotp) -> Result<(), ApplicationError> {
        let mut user = load_user(&self.user_repo, &command.user_id).await?;
        let secret = match (&user.totp_secret, user.totp_enabled) {
            (Some(secret), true) => secret.clone(),
            _ => return Err(ApplicationError::validation("TOTP未启用")),
        };

        check_code(&secret, command.token.as_deref())?;

        user.disable_totp();
        self.user_repo.update(&user).await?;
        tracing::info!(user_id = %user.id, "TOTP disabled");
        Ok(())
    }
}

// ============================================================================
// Passkey
// ============================================================================

/// RegisterPasskey Handler
pub struct RegisterPasskeyHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl RegisterPasskeyHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(
        &self,
        command: RegisterPasskey,
    ) -> Result<PasskeyCredential, ApplicationError> {
        let credential_id = command
            .credential_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApplicationError::validation("缺少必要参数"))?;
        let name = command
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Passkey".to_string());

        let mut user = load_user(&self.user_repo, &command.user_id).await?;
        let credential = PasskeyCredential::new(credential_id, name);
        user.add_passkey(credential.clone()).map_err(|e| match e {
            UserError::DuplicatePasskey(_) => ApplicationError::Conflict("Passkey 凭证已存在".to_string()),
            other => ApplicationError::validation(other.to_string()),
        })?;
        self.user_repo.update(&user).await?;

        tracing::info!(
            user_id = %user.id,
            credential = %PasskeyCredential::short_id(&credential.credential_id),
            "Passkey credential registered"
        );
        Ok(credential)
    }
}

/// RemovePasskey Handler
pub struct RemovePasskeyHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl RemovePasskeyHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: RemovePasskey) -> Result<(), ApplicationError> {
        let credential_id = command
            .credential_id
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApplicationError::validation("缺少必要参数"))?;

        let mut user = load_user(&self.user_repo, &command.user_id).await?;
        user.remove_passkey(credential_id.trim())
            .map_err(|_| ApplicationError::not_found("Passkey 凭证不存在"))?;
        self.user_repo.update(&user).await?;

        tracing::info!(
            user_id = %user.id,
            credential = %PasskeyCredential::short_id(&credential_id),
            remaining = user.passkey_credentials.len(),
            "Passkey credential removed"
        );
        Ok(())
    }
}
