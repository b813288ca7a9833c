//! Fake TTS Client - 用于测试的 TTS 客户端
//!
//! 不调用外部服务，返回由文本生成的假音频

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{SpeechAudio, SpeechRequest, TtsEnginePort, TtsError};

/// Fake TTS Client
pub struct FakeTtsClient {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// 每次调用都返回服务错误
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeTtsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = request.text.len(),
            voice = request.voice.as_str(),
            "FakeTtsClient: returning fake audio"
        );

        if self.fail {
            return Err(TtsError::ServiceError("HTTP 401: invalid api key".to_string()));
        }

        Ok(SpeechAudio {
            data: format!("FAKE-{}:{}", request.format.extension(), request.text).into_bytes(),
            content_type: Some(request.format.content_type().to_string()),
        })
    }
}
