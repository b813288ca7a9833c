//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::security::TokenService;
use crate::application::{
    // Command handlers
    DisableTotpHandler, EnableTotpHandler, LoginHandler, LogoutHandler, PasskeyVerifyHandler,
    RegisterHandler, RegisterPasskeyHandler, RemovePasskeyHandler, SetupTotpHandler,
    SynthesizeSpeechHandler, UploadShareLogHandler, VerifyEmailHandler, VerifyUserHandler,
    // Query handlers
    GetAudioHandler, GetCurrentUserHandler, ListPasskeysHandler, ListShareLogsHandler,
    QueryShareLogHandler,
    // Ports
    AudioStoragePort, EmailSenderPort, RateLimiterPort, ShareBlobStoragePort,
    ShareTextRepositoryPort, TtsEnginePort, UserRepositoryPort, VerificationCodeStorePort,
    // Guards
    AdminGate, Authenticator,
};
use crate::config::AppConfig;

/// 构建 AppState 所需的端口实现
#[derive(Clone)]
pub struct AppPorts {
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub share_text_repo: Arc<dyn ShareTextRepositoryPort>,
    pub share_blob_storage: Arc<dyn ShareBlobStoragePort>,
    pub audio_storage: Arc<dyn AudioStoragePort>,
    pub tts_engine: Arc<dyn TtsEnginePort>,
    pub email_sender: Arc<dyn EmailSenderPort>,
    pub verification_codes: Arc<dyn VerificationCodeStorePort>,
    /// LogShare 三个接口共用，按 IP 计数
    pub logshare_limiter: Arc<dyn RateLimiterPort>,
    /// TTS 全局限流
    pub tts_limiter: Arc<dyn RateLimiterPort>,
}

/// 应用状态
pub struct AppState {
    pub authenticator: Arc<Authenticator>,

    // ========== Auth ==========
    pub register_handler: RegisterHandler,
    pub verify_email_handler: VerifyEmailHandler,
    pub login_handler: LoginHandler,
    pub passkey_verify_handler: PasskeyVerifyHandler,
    pub verify_user_handler: VerifyUserHandler,
    pub logout_handler: LogoutHandler,
    pub current_user_handler: GetCurrentUserHandler,

    // ========== Two-factor ==========
    pub setup_totp_handler: SetupTotpHandler,
    pub enable_totp_handler: EnableTotpHandler,
    pub disable_totp_handler: DisableTotpHandler,
    pub register_passkey_handler: RegisterPasskeyHandler,
    pub remove_passkey_handler: RemovePasskeyHandler,
    pub list_passkeys_handler: ListPasskeysHandler,

    // ========== LogShare ==========
    pub upload_share_log_handler: UploadShareLogHandler,
    pub list_share_logs_handler: ListShareLogsHandler,
    pub query_share_log_handler: QueryShareLogHandler,

    // ========== TTS ==========
    pub synthesize_handler: SynthesizeSpeechHandler,
    pub get_audio_handler: GetAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ports: AppPorts, config: &AppConfig) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.jwt_ttl_secs,
        ));
        let authenticator = Arc::new(Authenticator::new(ports.user_repo.clone(), tokens.clone()));
        let gate = Arc::new(AdminGate::new(
            ports.logshare_limiter.clone(),
            ports.user_repo.clone(),
        ));
        let kdf = config.logshare.key_derivation;
        let user_repo = ports.user_repo;

        Self {
            authenticator: authenticator.clone(),

            register_handler: RegisterHandler::new(
                user_repo.clone(),
                ports.verification_codes.clone(),
                ports.email_sender.clone(),
                &config.auth,
            ),
            verify_email_handler: VerifyEmailHandler::new(
                user_repo.clone(),
                ports.verification_codes.clone(),
            ),
            login_handler: LoginHandler::new(user_repo.clone(), tokens.clone(), &config.auth),
            passkey_verify_handler: PasskeyVerifyHandler::new(user_repo.clone(), tokens.clone()),
            verify_user_handler: VerifyUserHandler::new(user_repo.clone(), tokens.clone()),
            logout_handler: LogoutHandler::new(user_repo.clone()),
            current_user_handler: GetCurrentUserHandler::new(
                user_repo.clone(),
                config.tts.daily_limit,
            ),

            setup_totp_handler: SetupTotpHandler::new(user_repo.clone()),
            enable_totp_handler: EnableTotpHandler::new(user_repo.clone()),
            disable_totp_handler: DisableTotpHandler::new(user_repo.clone()),
            register_passkey_handler: RegisterPasskeyHandler::new(user_repo.clone()),
            remove_passkey_handler: RemovePasskeyHandler::new(user_repo.clone()),
            list_passkeys_handler: ListPasskeysHandler::new(user_repo.clone()),

            upload_share_log_handler: UploadShareLogHandler::new(
                gate.clone(),
                ports.share_text_repo.clone(),
                ports.share_blob_storage.clone(),
                config.logshare.max_file_bytes,
                config.server.public_site_url.clone(),
            ),
            list_share_logs_handler: ListShareLogsHandler::new(
                gate.clone(),
                authenticator,
                ports.share_text_repo.clone(),
                ports.share_blob_storage.clone(),
                kdf,
            ),
            query_share_log_handler: QueryShareLogHandler::new(
                gate,
                ports.share_text_repo,
                ports.share_blob_storage,
                kdf,
            ),

            synthesize_handler: SynthesizeSpeechHandler::new(
                ports.tts_engine,
                ports.audio_storage.clone(),
                user_repo,
                ports.tts_limiter,
                config.tts.daily_limit,
            ),
            get_audio_handler: GetAudioHandler::new(ports.audio_storage),
        }
    }
}
