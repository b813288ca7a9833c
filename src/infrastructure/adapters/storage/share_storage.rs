//! Share Storage - LogShare 二进制文件存储
//!
//! 文件直接以 `<id><ext>` 命名放在同一目录下

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{BlobStorageError, ShareBlobStoragePort, StoredBlob};
use crate::domain::logshare::{FileExt, ShareBlobInfo, ShareFileId};

/// 文件系统分享存储
pub struct FsShareBlobStorage {
    dir: PathBuf,
}

impl FsShareBlobStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// 目录不存在视为空
    async fn file_names(&self) -> Result<Vec<String>, BlobStorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BlobStorageError::IoError(e.to_string())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl ShareBlobStoragePort for FsShareBlobStorage {
    async fn ensure_writable(&self) -> Result<(), BlobStorageError> {
        let not_writable = |e: std::io::Error| {
            tracing::error!(dir = %self.dir.display(), error = %e, "Share directory not writable");
            BlobStorageError::NotWritable(e.to_string())
        };

        fs::create_dir_all(&self.dir).await.map_err(not_writable)?;

        let probe = self.dir.join(format!(".write-test-{}", uuid::Uuid::new_v4()));
        fs::write(&probe, b"").await.map_err(not_writable)?;
        let _ = fs::remove_file(&probe).await;
        Ok(())
    }

    async fn save(
        &self,
        file_id: &ShareFileId,
        ext: &FileExt,
        data: &[u8],
    ) -> Result<(), BlobStorageError> {
        let path = self.dir.join(format!("{}{}", file_id, ext));
        fs::write(&path, data)
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        tracing::debug!(path = %path.display(), size = data.len(), "Saved share file");
        Ok(())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<StoredBlob>, BlobStorageError> {
        let Some(file_name) = self
            .file_names()
            .await?
            .into_iter()
            .find(|name| name.starts_with(prefix))
        else {
            return Ok(None);
        };

        let data = fs::read(self.dir.join(&file_name))
            .await
            .map_err(|e| BlobStorageError::IoError(e.to_string()))?;

        Ok(Some(StoredBlob {
            ext: FileExt::from_stored_name(&file_name),
            file_name,
            data,
        }))
    }

    async fn list(&self) -> Result<Vec<ShareBlobInfo>, BlobStorageError> {
        let mut blobs = Vec::new();
        for file_name in self.file_names().await? {
            let metadata = match fs::metadata(self.dir.join(&file_name)).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Skipping unreadable share file");
                    continue;
                }
            };
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            let file_id = Path::new(&file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&file_name)
                .to_string();

            blobs.push(ShareBlobInfo {
                file_id,
                ext: FileExt::from_stored_name(&file_name),
                size: metadata.len(),
                modified_at,
            });
        }
        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_find_and_list() {
        let temp_dir = tempdir().unwrap();
        let storage = FsShareBlobStorage::new(temp_dir.path().join("sharelogs"));
        storage.ensure_writable().await.unwrap();

        let id = ShareFileId::parse("abcd1234abcd1234").unwrap();
        let ext = FileExt::from_trusted(".png");
        storage.save(&id, &ext, &[1, 2, 3, 4]).await.unwrap();

        let blob = storage.find_by_prefix("abcd1234").await.unwrap().unwrap();
        assert_eq!(blob.file_name, "abcd1234abcd1234.png");
        assert_eq!(blob.ext.as_str(), ".png");
        assert_eq!(blob.data, vec![1, 2, 3, 4]);
        assert!(storage.find_by_prefix("ffff").await.unwrap().is_none());

        let listed = storage.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_id, "abcd1234abcd1234");
        assert_eq!(listed[0].size, 4);
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let temp_dir = tempdir().unwrap();
        let storage = FsShareBlobStorage::new(temp_dir.path().join("nope"));
        assert!(storage.list().await.unwrap().is_empty());
        assert!(storage.find_by_prefix("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_check_file_not_listed() {
        let temp_dir = tempdir().unwrap();
        let storage = FsShareBlobStorage::new(temp_dir.path());
        storage.ensure_writable().await.unwrap();
        storage.ensure_writable().await.unwrap();
        assert!(storage.list().await.unwrap().is_empty());
    }
}
