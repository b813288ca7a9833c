//! Speech Commands

use crate::domain::speech::{AudioFormat, Speed, SpeechModel, SpeechVoice};

/// 文本转语音
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub user_id: String,
    pub text: String,
    pub model: SpeechModel,
    pub voice: SpeechVoice,
    pub format: AudioFormat,
    pub speed: Speed,
    pub custom_file_name: Option<String>,
}
