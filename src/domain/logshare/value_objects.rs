//! LogShare Context - Value Objects

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 存入数据库的文本扩展名
const TEXT_EXTENSIONS: &[&str] = &[".txt", ".log", ".json", ".md"];

/// 分享文件 ID
///
/// 新生成的 ID 为 8 个随机字节的小写十六进制（16 字符）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareFileId(String);

impl ShareFileId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// 解析外部传入的 ID，只接受十六进制字符
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() || id.len() > 64 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(id.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShareFileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 文件扩展名（含前导点，小写）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileExt(String);

impl FileExt {
    /// 从原始文件名提取扩展名，缺省为 `.txt`
    pub fn from_file_name(file_name: Option<&str>) -> Self {
        file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| Self(format!(".{}", ext.to_ascii_lowercase())))
            .unwrap_or_else(Self::text_default)
    }

    /// 从存储文件名（`<id><ext>`）提取扩展名
    pub fn from_stored_name(file_name: &str) -> Self {
        Self::from_file_name(Some(file_name))
    }

    pub fn from_trusted(ext: impl Into<String>) -> Self {
        Self(ext.into())
    }

    pub fn text_default() -> Self {
        Self(".txt".to_string())
    }

    /// 文本类型存数据库，其余写文件系统
    pub fn is_text(&self) -> bool {
        TEXT_EXTENSIONS.contains(&self.0.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileExt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
