//! LogShare Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::admin_gate::{AdminGate, BAD_ADMIN_PASSWORD};
use crate::application::commands::UploadShareLog;
use crate::application::error::ApplicationError;
use crate::application::ports::{ShareBlobStoragePort, ShareTextRepositoryPort};
use crate::domain::logshare::{FileExt, ShareFileId, ShareTextRecord};

const OPERATION: &str = "upload";

/// 上传响应
#[derive(Debug, Clone)]
pub struct UploadShareLogResponse {
    pub id: String,
    pub link: String,
    pub ext: String,
}

/// UploadShareLog Handler
pub struct UploadShareLogHandler {
    gate: Arc<AdminGate>,
    text_repo: Arc<dyn ShareTextRepositoryPort>,
    blob_storage: Arc<dyn ShareBlobStoragePort>,
    max_file_bytes: u64,
    public_site_url: String,
}

impl UploadShareLogHandler {
    pub fn new(
        gate: Arc<AdminGate>,
        text_repo: Arc<dyn ShareTextRepositoryPort>,
        blob_storage: Arc<dyn ShareBlobStoragePort>,
        max_file_bytes: u64,
        public_site_url: impl Into<String>,
    ) -> Self {
        Self {
            gate,
            text_repo,
            blob_storage,
            max_file_bytes,
            public_site_url: public_site_url.into(),
        }
    }

    pub async fn handle(
        &self,
        command: UploadShareLog,
    ) -> Result<UploadShareLogResponse, ApplicationError> {
        let ip = command.client_ip.as_str();
        self.gate.throttle(OPERATION, ip)?;

        let file_name = command.file.as_ref().and_then(|f| f.file_name.clone());
        let file_label = file_name.as_deref().unwrap_or("-");

        if let Err(e) = self.blob_storage.ensure_writable().await {
            tracing::error!(error = %e, "Share directory not writable");
            return Err(ApplicationError::StorageError(
                "服务器日志目录不可写，请联系管理员".to_string(),
            ));
        }

        let (file, password) = match (command.file, command.admin_password) {
            (Some(file), Some(password)) if !password.is_empty() => (file, password),
            (file, _) => {
                tracing::warn!(
                    operation = OPERATION,
                    ip = %ip,
                    file = %file_label,
                    has_file = file.is_some(),
                    result = "failed",
                    reason = "missing_params",
                    "LogShare upload rejected"
                );
                return Err(ApplicationError::validation("缺少参数"));
            }
        };

        let size = file.data.len() as u64;
        if size > self.max_file_bytes {
            tracing::warn!(
                operation = OPERATION,
                ip = %ip,
                file = %file_label,
                size = size,
                result = "failed",
                reason = "too_large",
                "LogShare upload rejected"
            );
            return Err(ApplicationError::validation("文件内容过大"));
        }

        if !self.gate.is_admin_password(&password).await? {
            tracing::warn!(
                operation = OPERATION,
                ip = %ip,
                file = %file_label,
                result = "failed",
                reason = "bad_admin_password",
                "LogShare upload rejected"
            );
            return Err(ApplicationError::forbidden(BAD_ADMIN_PASSWORD));
        }

        let ext = FileExt::from_file_name(file.file_name.as_deref());
        let file_id = ShareFileId::generate();

        if ext.is_text() {
            let record = ShareTextRecord {
                file_id: file_id.clone(),
                ext: ext.clone(),
                content: String::from_utf8_lossy(&file.data).into_owned(),
                file_name: file.file_name.clone(),
                created_at: Utc::now(),
            };
            self.text_repo.save(&record).await.map_err(|e| {
                tracing::error!(file_id = %file_id, error = %e, "Failed to store shared text");
                ApplicationError::internal("日志上传失败")
            })?;
            tracing::info!(file_id = %file_id, ext = %ext, chars = record.size(), "Shared text stored in database");
        } else {
            self.blob_storage
                .save(&file_id, &ext, &file.data)
                .await
                .map_err(|e| {
                    tracing::error!(file_id = %file_id, error = %e, "Failed to write shared file");
                    ApplicationError::StorageError(
                        "服务器写入日志文件失败，请联系管理员".to_string(),
                    )
                })?;
            tracing::info!(file_id = %file_id, ext = %ext, size = size, "Shared file written");
        }

        tracing::info!(
            operation = OPERATION,
            ip = %ip,
            file = %file_label,
            file_id = %file_id,
            result = "ok",
            "LogShare upload succeeded"
        );

        Ok(UploadShareLogResponse {
            link: format!(
                "{}/logshare?id={}",
                self.public_site_url.trim_end_matches('/'),
                file_id
            ),
            id: file_id.to_string(),
            ext: ext.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::UploadedFile;
    use crate::application::ports::{BlobStorageError, StoredBlob, UserRepositoryPort};
    use crate::application::security::hash_password;
    use crate::domain::logshare::ShareBlobInfo;
    use crate::domain::user::{Email, Role, User, Username};
    use crate::infrastructure::adapters::storage::FsShareBlobStorage;
    use crate::infrastructure::memory::SlidingWindowRateLimiter;
    use crate::infrastructure::persistence::sqlite::{
        create_test_pool, SqliteShareTextRepository, SqliteUserRepository,
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    const ADMIN_PW: &str = "admin-secret";

    /// 目录检查通过但写入总是失败
    struct FailingWrites;

    #[async_trait]
    impl ShareBlobStoragePort for FailingWrites {
        async fn ensure_writable(&self) -> Result<(), BlobStorageError> {
            Ok(())
        }

        async fn save(
            &self,
            _file_id: &ShareFileId,
            _ext: &FileExt,
            _data: &[u8],
        ) -> Result<(), BlobStorageError> {
            Err(BlobStorageError::IoError("disk full".to_string()))
        }

        async fn find_by_prefix(
            &self,
            _prefix: &str,
        ) -> Result<Option<StoredBlob>, BlobStorageError> {
            Ok(None)
        }

        async fn list(&self) -> Result<Vec<ShareBlobInfo>, BlobStorageError> {
            Ok(Vec::new())
        }
    }

    async fn handler(blobs: Arc<dyn ShareBlobStoragePort>) -> UploadShareLogHandler {
        let pool = create_test_pool().await.unwrap();
        let users: Arc<dyn UserRepositoryPort> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let admin = User::new(
            Username::new("admin").unwrap(),
            Email::from_trusted("admin@gmail.com"),
            hash_password(ADMIN_PW).unwrap(),
            Role::Admin,
        );
        users.insert(&admin).await.unwrap();

        let limiter = Arc::new(SlidingWindowRateLimiter::new(10, Duration::from_secs(60)));
        UploadShareLogHandler::new(
            Arc::new(AdminGate::new(limiter, users)),
            Arc::new(SqliteShareTextRepository::new(pool)),
            blobs,
            25600,
            "https://tts.hapx.one/",
        )
    }

    fn upload(name: &str, data: &[u8]) -> UploadShareLog {
        UploadShareLog {
            file: Some(UploadedFile {
                file_name: Some(name.to_string()),
                data: data.to_vec(),
            }),
            admin_password: Some(ADMIN_PW.to_string()),
            client_ip: "10.0.0.2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unwritable_share_dir() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let blobs = Arc::new(FsShareBlobStorage::new(blocker.join("sharelogs")));

        let result = handler(blobs).await.handle(upload("app.log", b"hello")).await;
        assert!(matches!(
            result,
            Err(ApplicationError::StorageError(m)) if m == "服务器日志目录不可写，请联系管理员"
        ));
    }

    #[tokio::test]
    async fn test_blob_write_failure() {
        let handler = handler(Arc::new(FailingWrites)).await;

        let result = handler.handle(upload("shot.png", &[0x89, 0x50, 0x4e, 0x47])).await;
        assert!(matches!(
            result,
            Err(ApplicationError::StorageError(m)) if m == "服务器写入日志文件失败，请联系管理员"
        ));

        // 文本类走数据库，不受文件写入影响
        let ok = handler.handle(upload("app.log", b"hello")).await.unwrap();
        assert_eq!(ok.ext, ".log");
        assert_eq!(ok.link, format!("https://tts.hapx.one/logshare?id={}", ok.id));
    }
}
