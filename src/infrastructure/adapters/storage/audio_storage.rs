//! File Storage - 合成音频的文件系统存储
//!
//! 实现 AudioStoragePort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{AudioStorageError, AudioStoragePort};

/// 文件系统音频存储
pub struct FsAudioStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FsAudioStorage {
    /// 目录在首次写入时创建
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// 只允许单层文件名
fn is_bare_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains(['/', '\\', '\0'])
        && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name)
}

#[async_trait]
impl AudioStoragePort for FsAudioStorage {
    fn audio_path(&self, file_name: &str) -> Result<PathBuf, AudioStorageError> {
        if !is_bare_name(file_name) {
            return Err(AudioStorageError::InvalidName(file_name.to_string()));
        }
        Ok(self.base_dir.join(file_name))
    }

    async fn exists(&self, file_name: &str) -> bool {
        match self.audio_path(file_name) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn save(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, AudioStorageError> {
        let path = self.audio_path(file_name)?;

        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        fs::write(&path, data)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!(file = %file_name, size = data.len(), "Saved audio");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_exists() {
        let temp_dir = tempdir().unwrap();
        let storage = FsAudioStorage::new(temp_dir.path().join("finish"));

        assert!(!storage.exists("a.mp3").await);
        let path = storage.save("a.mp3", b"fake mp3").await.unwrap();
        assert!(path.exists());
        assert!(storage.exists("a.mp3").await);
        assert_eq!(std::fs::read(path).unwrap(), b"fake mp3");
    }

    #[test]
    fn test_rejects_paths() {
        let storage = FsAudioStorage::new("/tmp/finish");
        for bad in ["", ".", "..", "../etc/passwd", "a/b.mp3", "a\\b.mp3", "/abs.mp3"] {
            assert!(
                matches!(storage.audio_path(bad), Err(AudioStorageError::InvalidName(_))),
                "{bad} should be rejected"
            );
        }
        assert_eq!(
            storage.audio_path("ok.wav").unwrap(),
            PathBuf::from("/tmp/finish/ok.wav")
        );
    }

    #[tokio::test]
    async fn test_save_rejects_traversal() {
        let temp_dir = tempdir().unwrap();
        let storage = FsAudioStorage::new(temp_dir.path());
        let result = storage.save("../escape.mp3", b"x").await;
        assert!(matches!(result, Err(AudioStorageError::InvalidName(_))));
    }
}
