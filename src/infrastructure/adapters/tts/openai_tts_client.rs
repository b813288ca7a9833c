//! OpenAI TTS Client - 调用 OpenAI 兼容的语音合成接口
//!
//! 实现 TtsEnginePort trait
//!
//! 外部 API:
//! POST {base_url}/audio/speech
//! Authorization: Bearer <api_key>
//! Request: {"model": "...", "voice": "...", "input": "...", "response_format": "mp3", "speed": 1.0}
//! Response: 编码后的音频二进制

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechAudio, SpeechRequest, TtsEnginePort, TtsError};
use crate::config::TtsConfig;

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SpeechHttpRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
    speed: f32,
}

/// OpenAI TTS 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiTtsClientConfig {
    /// API 基础 URL，如 https://api.openai.com/v1
    pub base_url: String,
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 重试次数
    pub max_retries: u32,
}

impl Default for OpenAiTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

impl OpenAiTtsClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

impl From<&TtsConfig> for OpenAiTtsClientConfig {
    fn from(config: &TtsConfig) -> Self {
        Self::new(&config.api_url, &config.api_key)
            .with_timeout(config.timeout_secs)
            .with_retries(config.max_retries)
    }
}

/// OpenAI TTS 客户端
pub struct OpenAiTtsClient {
    client: Client,
    config: OpenAiTtsClientConfig,
}

impl OpenAiTtsClient {
    pub fn new(config: OpenAiTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.config.base_url.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    async fn request_once(&self, request: &SpeechRequest) -> Result<SpeechAudio, TtsError> {
        let body = SpeechHttpRequest {
            model: request.model.as_str(),
            voice: request.voice.as_str(),
            input: &request.text,
            response_format: request.format.extension(),
            speed: request.speed.value(),
        };

        let response = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if data.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        Ok(SpeechAudio { data, content_type })
    }
}

/// 网络抖动和 5xx 值得重试，4xx 不重试
fn is_retryable(error: &TtsError) -> bool {
    match error {
        TtsError::NetworkError(_) | TtsError::Timeout => true,
        TtsError::ServiceError(msg) => msg.starts_with("HTTP 5"),
        TtsError::InvalidResponse(_) => false,
    }
}

#[async_trait]
impl TtsEnginePort for OpenAiTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, TtsError> {
        tracing::debug!(
            url = %self.speech_url(),
            model = request.model.as_str(),
            voice = request.voice.as_str(),
            text_len = request.text.len(),
            "Sending TTS speech request"
        );

        let mut attempt = 0;
        loop {
            match self.request_once(&request).await {
                Ok(audio) => {
                    tracing::info!(
                        audio_size = audio.data.len(),
                        content_type = ?audio.content_type,
                        attempt,
                        "TTS synthesis completed"
                    );
                    return Ok(audio);
                }
                Err(e) if attempt < self.config.max_retries && is_retryable(&e) => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "TTS request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.models_url())
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
