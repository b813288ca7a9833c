//! TTS Engine Port - 语音合成后端抽象
//!
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::speech::{AudioFormat, Speed, SpeechModel, SpeechVoice};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub model: SpeechModel,
    pub voice: SpeechVoice,
    pub format: AudioFormat,
    pub speed: Speed,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// 编码后的音频数据
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// TTS Engine Port
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 执行合成
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, TtsError>;

    /// 检查后端是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
