//! Share Blob Storage Port - 二进制日志文件存储

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::logshare::{FileExt, ShareBlobInfo, ShareFileId};

/// 分享文件存储错误
#[derive(Debug, Error)]
pub enum BlobStorageError {
    #[error("Share directory not writable: {0}")]
    NotWritable(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 按 ID 前缀查找到的文件
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub file_name: String,
    pub ext: FileExt,
    pub data: Vec<u8>,
}

/// Share Blob Storage Port
///
/// 文件名格式为 `<id><ext>`
#[async_trait]
pub trait ShareBlobStoragePort: Send + Sync {
    /// 确保目录存在且可写
    async fn ensure_writable(&self) -> Result<(), BlobStorageError>;

    async fn save(
        &self,
        file_id: &ShareFileId,
        ext: &FileExt,
        data: &[u8],
    ) -> Result<(), BlobStorageError>;

    /// 返回第一个文件名以 `prefix` 开头的文件
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<StoredBlob>, BlobStorageError>;

    /// 列出目录中的全部文件
    async fn list(&self) -> Result<Vec<ShareBlobInfo>, BlobStorageError>;
}
