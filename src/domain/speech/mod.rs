//! Speech Context - 语音合成限界上下文
//!
//! 职责:
//! - 模型 / 音色 / 格式 / 语速取值约束
//! - 输出文件命名规则

mod value_objects;

use thiserror::Error;

pub use value_objects::{
    content_type_for, is_reserved_file_name, normalize_file_name, AudioFormat, Speed, SpeechModel, SpeechVoice,
};

/// 空文本时直接返回的静音文件
pub const SILENCE_FILE_NAME: &str = "1-second-of-silence.mp3";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("语速必须在 0.5 到 2.0 之间: {0}")]
    InvalidSpeed(f32),
}
