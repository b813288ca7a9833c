//! Audio Queries - 音频查询

use std::path::PathBuf;

/// 获取合成音频
#[derive(Debug, Clone)]
pub struct GetAudioQuery {
    pub file_name: String,
}

/// 获取音频响应（由 HTTP 层流式返回）
#[derive(Debug, Clone)]
pub struct GetAudioResponse {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
}
