//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::SpeechError;

/// 合成模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeechModel {
    #[serde(rename = "tts-1")]
    Tts1,
    #[default]
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
}

impl SpeechModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tts1 => "tts-1",
            Self::Tts1Hd => "tts-1-hd",
        }
    }
}

/// 音色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechVoice {
    Alloy,
    Echo,
    Fable,
    Onyx,
    #[default]
    Nova,
    Shimmer,
}

impl SpeechVoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }
}

/// 输出音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "opus" => Some(Self::Opus),
            "aac" => Some(Self::Aac),
            "flac" => Some(Self::Flac),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/ogg",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
        }
    }
}

/// 根据文件名推断 Content-Type
pub fn content_type_for(file_name: &str) -> &'static str {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(AudioFormat::from_extension)
        .map(|f| f.content_type())
        .unwrap_or("application/octet-stream")
}

/// 语速 (0.5 - 2.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Speed(f32);

impl Speed {
    pub fn new(value: f32) -> Result<Self, SpeechError> {
        if !(0.5..=2.0).contains(&value) {
            return Err(SpeechError::InvalidSpeed(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// 规范化用户给定的输出文件名
///
/// - 去掉目录部分
/// - 扩展名与输出格式不符时替换为正确扩展名
/// - 空名称返回 None
pub fn normalize_file_name(custom: Option<&str>, format: AudioFormat) -> Option<String> {
    let raw = custom?.trim();
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }

    let suffix = format!(".{}", format.extension());
    if base.ends_with(&suffix) {
        return Some(base.to_string());
    }

    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(base);
    Some(format!("{}{}", stem, suffix))
}

/// 自定义文件名是否与共享文件冲突：静音文件或 md5 缓存名
pub fn is_reserved_file_name(name: &str) -> bool {
    if name.eq_ignore_ascii_case(super::SILENCE_FILE_NAME) {
        return true;
    }
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.len() == 32 && stem.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_file_names() {
        assert!(is_reserved_file_name("1-second-of-silence.mp3"));
        assert!(is_reserved_file_name("1-Second-Of-Silence.MP3"));
        assert!(is_reserved_file_name("0123456789abcdef0123456789abcdef.flac"));
        assert!(!is_reserved_file_name("greeting.mp3"));
        assert!(!is_reserved_file_name("0123456789abcdef.mp3"));
    }

    #[test]
    fn test_speed_range() {
        assert!(Speed::new(0.5).is_ok());
        assert!(Speed::new(2.0).is_ok());
        assert!(Speed::new(2.1).is_err());
        assert!(Speed::new(0.1).is_err());
    }

    #[test]
    fn test_normalize_keeps_matching_extension() {
        assert_eq!(
            normalize_file_name(Some("hello.mp3"), AudioFormat::Mp3).as_deref(),
            Some("hello.mp3")
        );
    }

    #[test]
    fn test_normalize_replaces_extension() {
        assert_eq!(
            normalize_file_name(Some("hello.wav"), AudioFormat::Flac).as_deref(),
            Some("hello.flac")
        );
        assert_eq!(
            normalize_file_name(Some("hello"), AudioFormat::Opus).as_deref(),
            Some("hello.opus")
        );
    }

    #[test]
    fn test_normalize_strips_directories() {
        assert_eq!(
            normalize_file_name(Some("../../etc/passwd"), AudioFormat::Mp3).as_deref(),
            Some("passwd.mp3")
        );
        assert_eq!(normalize_file_name(Some("  "), AudioFormat::Mp3), None);
        assert_eq!(normalize_file_name(Some("a/.."), AudioFormat::Mp3), None);
        assert_eq!(normalize_file_name(None, AudioFormat::Mp3), None);
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(content_type_for("x.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("x.bin"), "application/octet-stream");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::from_str::<SpeechModel>("\"tts-1\"").unwrap(),
            SpeechModel::Tts1
        );
        assert_eq!(
            serde_json::from_str::<SpeechVoice>("\"shimmer\"").unwrap(),
            SpeechVoice::Shimmer
        );
    }
}
