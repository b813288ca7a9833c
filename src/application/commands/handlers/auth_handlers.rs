//! Auth Command Handlers
//!
//! 注册、邮箱验证、登录、二次验证、登出

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{Login, Logout, PasskeyVerify, Register, VerifyEmail, VerifyUser};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    EmailMessage, EmailSenderPort, RepositoryError, UserRepositoryPort, VerificationCodeStorePort,
};
use crate::application::security::{hash_password, totp, verify_password, TokenService};
use crate::config::AuthConfig;
use crate::domain::user::{Email, PasskeyCredential, Role, SecondFactor, User, UserError, Username};

/// 邮箱验证码长度
const EMAIL_CODE_LEN: usize = 8;

const LOGIN_FAILED: &str = "用户名/邮箱或密码错误";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn generate_email_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(EMAIL_CODE_LEN)
        .map(char::from)
        .collect()
}

fn verification_email(to: &str, code: &str, ttl_minutes: u64) -> EmailMessage {
    let html = format!(
        r#"<div style="max-width:420px;margin:32px auto;padding:32px 24px;background:linear-gradient(135deg,#6366f1 0%,#a5b4fc 100%);border-radius:20px;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
  <div style="text-align:center;margin-bottom:24px;">
    <h2 style="margin:0 0 8px 0;color:#fff;font-size:1.8rem;font-weight:700;">邮箱验证</h2>
    <p style="color:#e0e7ff;font-size:1.1rem;margin:0;">欢迎注册 Happy-TTS</p>
  </div>
  <div style="background:#fff;border-radius:16px;padding:24px 16px;margin-bottom:24px;">
    <div style="text-align:center;font-size:1.1rem;color:#6366f1;font-weight:600;">您的验证码</div>
    <div style="font-size:2.2rem;font-weight:700;color:#4f46e5;letter-spacing:6px;margin:18px 0 8px 0;text-align:center;">{code}</div>
    <div style="color:#64748b;font-size:0.95rem;">有效期：{ttl}分钟。请勿泄露验证码。</div>
  </div>
  <div style="text-align:center;color:#64748b;font-size:0.95rem;">如非本人操作，请忽略此邮件。</div>
</div>"#,
        code = code,
        ttl = ttl_minutes
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Happy-TTS 注册验证码".to_string(),
        html,
        text: format!("您的注册验证码为：{}，{}分钟内有效。", code, ttl_minutes),
    }
}

// ============================================================================
// Register
// ============================================================================

/// 注册响应：总是需要邮箱验证
#[derive(Debug, Clone)]
pub struct RegisterResponse {
    pub user_id: String,
    pub need_verify: bool,
}

/// Register Handler
pub struct RegisterHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    codes: Arc<dyn VerificationCodeStorePort>,
    email_sender: Arc<dyn EmailSenderPort>,
    allowed_domains: Vec<String>,
    code_ttl: std::time::Duration,
}

impl RegisterHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        codes: Arc<dyn VerificationCodeStorePort>,
        email_sender: Arc<dyn EmailSenderPort>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            codes,
            email_sender,
            allowed_domains: config.allowed_email_domains.clone(),
            code_ttl: std::time::Duration::from_secs(config.email_code_ttl_secs),
        }
    }

    pub async fn handle(&self, command: Register) -> Result<RegisterResponse, ApplicationError> {
        let (username, email, password) = match (
            non_empty(command.username),
            non_empty(command.email),
            non_empty(command.password),
        ) {
            (Some(u), Some(e), Some(p)) => (u, e, p),
            _ => return Err(ApplicationError::validation("请提供所有必需的注册信息")),
        };

        let email = Email::parse(&email, &self.allowed_domains)
            .map_err(|e| ApplicationError::validation(e.to_string()))?;
        let username =
            Username::new(username).map_err(|e| ApplicationError::validation(e.to_string()))?;

        if self
            .user_repo
            .username_or_email_taken(username.as_str(), email.as_str())
            .await?
        {
            return Err(ApplicationError::validation("用户名或邮箱已被使用"));
        }

        let user = User::new(username, email, hash_password(&password)?, Role::User);
        match self.user_repo.insert(&user).await {
            Ok(()) => {}
            Err(RepositoryError::Duplicate(_)) => {
                return Err(ApplicationError::validation("用户名或邮箱已被使用"))
            }
            Err(e) => return Err(e.into()),
        }

        let code = generate_email_code();
        self.codes.put(user.email.as_str(), code.clone(), self.code_ttl);

        let message = verification_email(user.email.as_str(), &code, self.code_ttl.as_secs() / 60);
        if let Err(e) = self.email_sender.send(message).await {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                "Failed to send verification email"
            );
        }

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User registered, awaiting email verification"
        );

        Ok(RegisterResponse {
            user_id: user.id.to_string(),
            need_verify: true,
        })
    }
}

// ============================================================================
// VerifyEmail
// ============================================================================

/// VerifyEmail Handler
pub struct VerifyEmailHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    codes: Arc<dyn VerificationCodeStorePort>,
}

impl VerifyEmailHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        codes: Arc<dyn VerificationCodeStorePort>,
    ) -> Self {
        Self { user_repo, codes }
    }

    pub async fn handle(&self, command: VerifyEmail) -> Result<(), ApplicationError> {
        let (email, code) = match (non_empty(command.email), non_empty(command.code)) {
            (Some(e), Some(c)) => (e.trim().to_string(), c),
            _ => return Err(ApplicationError::validation("参数缺失")),
        };

        let expected = self
            .codes
            .get(&email)
            .ok_or_else(|| ApplicationError::validation("请先注册获取验证码"))?;
        if expected != code.trim() {
            return Err(ApplicationError::validation("验证码错误"));
        }
        self.codes.remove(&email);

        if let Some(mut user) = self.user_repo.find_by_email(&email).await? {
            user.email_verified = true;
            self.user_repo.update(&user).await?;
            tracing::info!(user_id = %user.id, "Email verified");
        }

        Ok(())
    }
}

// ============================================================================
// Login
// ============================================================================

/// 登录结果
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// 登录完成，返回 JWT
    Authenticated { user: User, token: String },
    /// 需要二次验证，返回临时令牌
    SecondFactorRequired {
        user: User,
        pending_token: String,
        factors: Vec<SecondFactor>,
    },
}

/// Login Handler
pub struct LoginHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    tokens: Arc<TokenService>,
    pending_ttl: Duration,
}

impl LoginHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        tokens: Arc<TokenService>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            tokens,
            pending_ttl: Duration::seconds(config.two_factor_ttl_secs as i64),
        }
    }

    pub async fn handle(&self, command: Login) -> Result<LoginOutcome, ApplicationError> {
        let identifier = non_empty(command.identifier)
            .ok_or_else(|| ApplicationError::validation("请提供用户名或邮箱"))?;
        let password =
            non_empty(command.password).ok_or_else(|| ApplicationError::validation("请提供密码"))?;
        let identifier = identifier.trim();

        let Some(mut user) = self.user_repo.find_by_identifier(identifier).await? else {
            tracing::warn!(identifier = %identifier, ip = %command.client_ip, "Login failed: unknown user");
            return Err(ApplicationError::unauthorized(LOGIN_FAILED));
        };

        if !verify_password(&password, &user.password_hash) {
            tracing::warn!(
                user_id = %user.id,
                ip = %command.client_ip,
                "Login failed: wrong password"
            );
            return Err(ApplicationError::unauthorized(LOGIN_FAILED));
        }

        if user.requires_second_factor() {
            let pending_token = Uuid::new_v4().to_string();
            user.set_pending_token(pending_token.clone(), self.pending_ttl, Utc::now());
            self.user_repo.update(&user).await?;

            let factors = user.second_factors();
            tracing::info!(
                user_id = %user.id,
                factors = ?factors,
                "Login requires second factor"
            );
            return Ok(LoginOutcome::SecondFactorRequired {
                user,
                pending_token,
                factors,
            });
        }

        let token = self.tokens.issue(user.id.as_str())?;
        tracing::info!(user_id = %user.id, ip = %command.client_ip, "Login succeeded");

        Ok(LoginOutcome::Authenticated { user, token })
    }
}

// ============================================================================
// PasskeyVerify
// ============================================================================

/// 二次验证通过后的响应
#[derive(Debug, Clone)]
pub struct SecondFactorResponse {
    pub user: User,
    pub token: String,
}

/// PasskeyVerify Handler
pub struct PasskeyVerifyHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    tokens: Arc<TokenService>,
}

impl PasskeyVerifyHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn handle(
        &self,
        command: PasskeyVerify,
    ) -> Result<SecondFactorResponse, ApplicationError> {
        let (username, credential_id) =
            match (non_empty(command.username), non_empty(command.credential_id)) {
                (Some(u), Some(c)) => (u, c),
                _ => return Err(ApplicationError::validation("缺少必要参数")),
            };

        let mut user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| {
                tracing::warn!(username = %username, "Passkey verify failed: unknown user");
                ApplicationError::not_found("用户不存在")
            })?;

        if !user.passkey_enabled || !user.has_passkey() {
            tracing::warn!(
                user_id = %user.id,
                passkey_enabled = user.passkey_enabled,
                credentials = user.passkey_credentials.len(),
                "Passkey verify failed: passkey not enabled"
            );
            return Err(ApplicationError::validation("用户未启用Passkey"));
        }

        if user.find_passkey(&credential_id).is_none() {
            let known: Vec<String> = user
                .passkey_credentials
                .iter()
                .map(|c| PasskeyCredential::short_id(&c.credential_id))
                .collect();
            tracing::warn!(
                user_id = %user.id,
                credential = %PasskeyCredential::short_id(&credential_id),
                known = ?known,
                "Passkey verify failed: unknown credential"
            );
            return Err(ApplicationError::unauthorized("Passkey 校验失败"));
        }

        user.passkey_verified = true;
        user.clear_pending_token();
        self.user_repo.update(&user).await?;

        let token = self.tokens.issue(user.id.as_str())?;
        tracing::info!(
            user_id = %user.id,
            credential = %PasskeyCredential::short_id(&credential_id),
            "Passkey verified"
        );

        Ok(SecondFactorResponse { user, token })
    }
}

// ============================================================================
// VerifyUser
// ============================================================================

/// VerifyUser Handler
pub struct VerifyUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    tokens: Arc<TokenService>,
}

impl VerifyUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn handle(&self, command: VerifyUser) -> Result<SecondFactorResponse, ApplicationError> {
        let (user_id, code) = match (non_empty(command.user_id), non_empty(command.verification_code)) {
            (Some(u), Some(c)) => (u, c),
            _ => return Err(ApplicationError::validation("用户ID或验证码缺失")),
        };

        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("用户不存在"))?;

        if !user.requires_second_factor() {
            return Err(ApplicationError::validation("用户未启用任何二次验证"));
        }

        let mut verified = false;
        if user.has_totp() {
            match user.totp_secret.as_deref() {
                Some(secret) => match totp::verify_code(secret, &code, Utc::now().timestamp()) {
                    Ok(true) => verified = true,
                    Ok(false) => tracing::warn!(user_id = %user.id, "TOTP verification failed"),
                    Err(e) => tracing::warn!(user_id = %user.id, error = %e, "Stored TOTP secret unusable"),
                },
                None => tracing::warn!(user_id = %user.id, "TOTP enabled without secret"),
            }
        }

        if !verified && user.has_passkey() {
            if user.find_passkey(code.trim()).is_some() {
                verified = true;
            } else {
                tracing::warn!(user_id = %user.id, "Passkey verification failed");
            }
        }

        if !verified {
            return Err(ApplicationError::unauthorized("验证码错误或用户未启用二次验证"));
        }

        user.verified = true;
        user.clear_pending_token();
        self.user_repo.update(&user).await?;

        let token = self.tokens.issue(user.id.as_str())?;
        tracing::info!(user_id = %user.id, "Second factor verified");

        Ok(SecondFactorResponse { user, token })
    }
}

// ============================================================================
// Logout
// ============================================================================

/// Logout Handler
pub struct LogoutHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl LogoutHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: Logout) -> Result<(), ApplicationError> {
        let Some(token) = non_empty(command.bearer) else {
            return Ok(());
        };

        if let Some(mut user) = self.user_repo.find_by_pending_token(&token).await? {
            user.clear_pending_token();
            self.user_repo.update(&user).await?;
            tracing::info!(user_id = %user.id, "Pending token cleared on logout");
        }

        Ok(())
    }
}

// ============================================================================
// EnsureAdmin
// ============================================================================

/// 启动时创建管理员账号（已有管理员则跳过）
pub struct EnsureAdminHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl EnsureAdminHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    /// 返回是否新建了管理员
    pub async fn handle(&self, config: &AuthConfig) -> Result<bool, ApplicationError> {
        let Some(password) = config.admin_password.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(false);
        };

        if !self.user_repo.find_admins().await?.is_empty() {
            tracing::debug!("Admin user already present");
            return Ok(false);
        }

        let username = Username::new(config.admin_username.clone().unwrap_or_else(|| "admin".to_string()))
            .map_err(|e: UserError| ApplicationError::validation(e.to_string()))?;
        let email = Email::from_trusted(
            config
                .admin_email
                .clone()
                .unwrap_or_else(|| format!("{}@localhost", username)),
        );

        let mut admin = User::new(username, email, hash_password(password)?, Role::Admin);
        admin.email_verified = true;
        self.user_repo.insert(&admin).await?;

        tracing::info!(user_id = %admin.id, username = %admin.username, "Admin user created");
        Ok(true)
    }
}
