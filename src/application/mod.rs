//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（仓储、文件存储、TTS 后端、邮件、限流）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - security: 加密、TOTP、JWT、密码哈希
//! - authenticator / admin_gate: 请求级认证与 LogShare 闸门
//! - error: 应用层错误定义

pub mod admin_gate;
pub mod authenticator;
pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod security;

// Re-exports
pub use admin_gate::AdminGate;
pub use authenticator::{bearer_token, AuthContext, Authenticator};

pub use commands::{
    // Auth commands
    Login,
    Logout,
    PasskeyVerify,
    Register,
    VerifyEmail,
    VerifyUser,
    // Two-factor commands
    DisableTotp,
    EnableTotp,
    RegisterPasskey,
    RemovePasskey,
    SetupTotp,
    // LogShare commands
    UploadShareLog,
    UploadedFile,
    // Speech commands
    SynthesizeSpeech,
    // Handlers
    handlers::{
        DisableTotpHandler, EnableTotpHandler, EnsureAdminHandler, LoginHandler, LoginOutcome,
        LogoutHandler, PasskeyVerifyHandler, RegisterHandler, RegisterPasskeyHandler,
        RemovePasskeyHandler, SetupTotpHandler, SynthesizeSpeechHandler, UploadShareLogHandler,
        VerifyEmailHandler, VerifyUserHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    AudioStorageError, AudioStoragePort, BlobStorageError, EmailError, EmailMessage,
    EmailSenderPort, RateLimiterPort, RepositoryError, ShareBlobStoragePort,
    ShareTextRepositoryPort, SpeechAudio, SpeechRequest, StoredBlob, TtsEnginePort, TtsError,
    UserRepositoryPort, VerificationCodeStorePort,
};

pub use queries::{
    // Audio queries
    GetAudioQuery,
    GetAudioResponse,
    // User queries
    GetCurrentUser,
    ListPasskeys,
    // LogShare queries
    ListShareLogs,
    QueryShareLog,
    // Handlers
    handlers::{
        GetAudioHandler, GetCurrentUserHandler, ListPasskeysHandler, ListShareLogsHandler,
        QueryShareLogHandler,
    },
};
