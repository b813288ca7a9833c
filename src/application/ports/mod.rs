//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_storage;
mod email_sender;
mod guards;
mod repositories;
mod share_storage;
mod tts_engine;

pub use audio_storage::{AudioStorageError, AudioStoragePort};
pub use email_sender::{EmailError, EmailMessage, EmailSenderPort};
pub use guards::{RateLimiterPort, VerificationCodeStorePort};
pub use repositories::{RepositoryError, ShareTextRepositoryPort, UserRepositoryPort};
pub use share_storage::{BlobStorageError, ShareBlobStoragePort, StoredBlob};
pub use tts_engine::{SpeechAudio, SpeechRequest, TtsEnginePort, TtsError};
