//! Audio Storage Port - 出站端口
//!
//! 合成音频的落盘与读取

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Storage Port - 出站端口
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 解析音频文件路径，只接受不含目录的文件名
    fn audio_path(&self, file_name: &str) -> Result<PathBuf, AudioStorageError>;

    /// 检查音频是否存在
    async fn exists(&self, file_name: &str) -> bool;

    /// 保存音频数据
    async fn save(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, AudioStorageError>;
}
