//! TTS Adapter - OpenAI 兼容语音合成客户端

mod fake_tts_client;
mod openai_tts_client;

pub use fake_tts_client::FakeTtsClient;
pub use openai_tts_client::*;
