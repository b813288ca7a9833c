//! LogShare Query Handlers
//!
//! 所有响应体都经 AES-256-CBC 加密：列表用 bearer 令牌作密钥，查询用管理员密码

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use std::sync::Arc;

use crate::application::admin_gate::{AdminGate, BAD_ADMIN_PASSWORD};
use crate::application::authenticator::Authenticator;
use crate::application::error::ApplicationError;
use crate::application::ports::{ShareBlobStoragePort, ShareTextRepositoryPort};
use crate::application::queries::{ListShareLogs, QueryShareLog};
use crate::application::security::{encrypt_payload, EncryptedPayload, KeyDerivation};
use crate::domain::logshare::{merge_share_logs, ShareFileId, ShareLogEntry};

const NOT_FOUND: &str = "日志不存在";

#[derive(Serialize)]
struct ShareLogList<'a> {
    logs: &'a [ShareLogEntry],
}

#[derive(Serialize)]
struct TextContent<'a> {
    content: &'a str,
    ext: &'a str,
}

#[derive(Serialize)]
struct BinaryContent<'a> {
    content: String,
    ext: &'a str,
    encoding: &'static str,
}

// ============================================================================
// ListShareLogs
// ============================================================================

/// ListShareLogs Handler
pub struct ListShareLogsHandler {
    gate: Arc<AdminGate>,
    authenticator: Arc<Authenticator>,
    text_repo: Arc<dyn ShareTextRepositoryPort>,
    blob_storage: Arc<dyn ShareBlobStoragePort>,
    key_derivation: KeyDerivation,
}

impl ListShareLogsHandler {
    pub fn new(
        gate: Arc<AdminGate>,
        authenticator: Arc<Authenticator>,
        text_repo: Arc<dyn ShareTextRepositoryPort>,
        blob_storage: Arc<dyn ShareBlobStoragePort>,
        key_derivation: KeyDerivation,
    ) -> Self {
        Self {
            gate,
            authenticator,
            text_repo,
            blob_storage,
            key_derivation,
        }
    }

    pub async fn handle(&self, query: ListShareLogs) -> Result<EncryptedPayload, ApplicationError> {
        let ip = query.client_ip.as_str();
        self.gate.throttle("list", ip)?;

        let ctx = self
            .authenticator
            .authenticate_admin(query.authorization.as_deref())
            .await
            .map_err(|e| {
                tracing::warn!(operation = "list", ip = %ip, result = "failed", reason = %e, "LogShare list rejected");
                e
            })?;

        let texts = self.text_repo.find_all().await?;
        let blobs = self.blob_storage.list().await?;
        let logs = merge_share_logs(texts, blobs);

        let encrypted = encrypt_payload(&ShareLogList { logs: &logs }, &ctx.token, self.key_derivation)?;

        tracing::info!(
            operation = "list",
            ip = %ip,
            user_id = %ctx.user.id,
            count = logs.len(),
            result = "ok",
            "LogShare list served"
        );
        Ok(encrypted)
    }
}

// ============================================================================
// QueryShareLog
// ============================================================================

/// QueryShareLog Handler
pub struct QueryShareLogHandler {
    gate: Arc<AdminGate>,
    text_repo: Arc<dyn ShareTextRepositoryPort>,
    blob_storage: Arc<dyn ShareBlobStoragePort>,
    key_derivation: KeyDerivation,
}

impl QueryShareLogHandler {
    pub fn new(
        gate: Arc<AdminGate>,
        text_repo: Arc<dyn ShareTextRepositoryPort>,
        blob_storage: Arc<dyn ShareBlobStoragePort>,
        key_derivation: KeyDerivation,
    ) -> Self {
        Self {
            gate,
            text_repo,
            blob_storage,
            key_derivation,
        }
    }

    pub async fn handle(&self, query: QueryShareLog) -> Result<EncryptedPayload, ApplicationError> {
        let ip = query.client_ip.as_str();
        self.gate.throttle("query", ip)?;

        let password = query
            .admin_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                tracing::warn!(operation = "query", ip = %ip, file_id = %query.id, result = "failed", reason = "missing_password", "LogShare query rejected");
                ApplicationError::validation("缺少管理员密码")
            })?;

        if !self.gate.is_admin_password(password).await? {
            tracing::warn!(operation = "query", ip = %ip, file_id = %query.id, result = "failed", reason = "bad_admin_password", "LogShare query rejected");
            return Err(ApplicationError::forbidden(BAD_ADMIN_PASSWORD));
        }

        let Some(file_id) = ShareFileId::parse(&query.id) else {
            tracing::warn!(operation = "query", ip = %ip, file_id = %query.id, result = "failed", reason = "invalid_id", "LogShare query rejected");
            return Err(ApplicationError::not_found(NOT_FOUND));
        };

        if let Some(record) = self.text_repo.find_by_id(&file_id).await? {
            if record.ext.is_text() {
                let encrypted = encrypt_payload(
                    &TextContent {
                        content: &record.content,
                        ext: record.ext.as_str(),
                    },
                    password,
                    self.key_derivation,
                )?;
                tracing::info!(operation = "query", ip = %ip, file_id = %file_id, kind = "text", result = "ok", "LogShare query served");
                return Ok(encrypted);
            }
        }

        let Some(blob) = self.blob_storage.find_by_prefix(file_id.as_str()).await? else {
            tracing::warn!(operation = "query", ip = %ip, file_id = %file_id, result = "failed", reason = "not_found", "LogShare query rejected");
            return Err(ApplicationError::not_found(NOT_FOUND));
        };

        let encrypted = encrypt_payload(
            &BinaryContent {
                content: BASE64.encode(&blob.data),
                ext: blob.ext.as_str(),
                encoding: "base64",
            },
            password,
            self.key_derivation,
        )?;
        tracing::info!(
            operation = "query",
            ip = %ip,
            file_id = %file_id,
            file = %blob.file_name,
            kind = "binary",
            result = "ok",
            "LogShare query served"
        );
        Ok(encrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::UploadShareLogHandler;
    use crate::application::commands::{UploadShareLog, UploadedFile};
    use crate::application::ports::UserRepositoryPort;
    use crate::application::security::{decrypt_payload, hash_password, TokenService};
    use crate::domain::user::{Email, Role, User, Username};
    use crate::infrastructure::adapters::storage::FsShareBlobStorage;
    use crate::infrastructure::memory::SlidingWindowRateLimiter;
    use crate::infrastructure::persistence::sqlite::{
        create_test_pool, SqliteShareTextRepository, SqliteUserRepository,
    };
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::TempDir;

    const ADMIN_PW: &str = "admin-secret";

    struct Fixture {
        _dir: TempDir,
        upload: UploadShareLogHandler,
        list: ListShareLogsHandler,
        query: QueryShareLogHandler,
        admin_token: String,
        user_token: String,
    }

    async fn fixture(rate_max: u32) -> Fixture {
        let dir = TempDir::new().unwrap();
        let pool = create_test_pool().await.unwrap();
        let users: Arc<dyn UserRepositoryPort> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let texts: Arc<dyn ShareTextRepositoryPort> =
            Arc::new(SqliteShareTextRepository::new(pool));
        let blobs: Arc<dyn ShareBlobStoragePort> =
            Arc::new(FsShareBlobStorage::new(dir.path().join("sharelogs")));

        let admin = User::new(
            Username::new("admin").unwrap(),
            Email::from_trusted("admin@gmail.com"),
            hash_password(ADMIN_PW).unwrap(),
            Role::Admin,
        );
        let user = User::new(
            Username::new("user").unwrap(),
            Email::from_trusted("user@gmail.com"),
            hash_password("pw").unwrap(),
            Role::User,
        );
        users.insert(&admin).await.unwrap();
        users.insert(&user).await.unwrap();

        let tokens = Arc::new(TokenService::new("secret", 3600));
        let limiter = Arc::new(SlidingWindowRateLimiter::new(rate_max, Duration::from_secs(60)));
        let gate = Arc::new(AdminGate::new(limiter, users.clone()));
        let authenticator = Arc::new(Authenticator::new(users.clone(), tokens.clone()));

        Fixture {
            _dir: dir,
            upload: UploadShareLogHandler::new(
                gate.clone(),
                texts.clone(),
                blobs.clone(),
                25600,
                "https://tts.hapx.one",
            ),
            list: ListShareLogsHandler::new(
                gate.clone(),
                authenticator,
                texts.clone(),
                blobs.clone(),
                KeyDerivation::Pbkdf2,
            ),
            query: QueryShareLogHandler::new(gate, texts, blobs, KeyDerivation::Pbkdf2),
            admin_token: tokens.issue(admin.id.as_str()).unwrap(),
            user_token: tokens.issue(user.id.as_str()).unwrap(),
        }
    }

    fn upload(name: &str, data: &[u8], password: Option<&str>) -> UploadShareLog {
        UploadShareLog {
            file: Some(UploadedFile {
                file_name: Some(name.to_string()),
                data: data.to_vec(),
            }),
            admin_password: password.map(str::to_string),
            client_ip: "10.0.0.1".to_string(),
        }
    }

    fn query(id: &str, password: Option<&str>) -> QueryShareLog {
        QueryShareLog {
            id: id.to_string(),
            admin_password: password.map(str::to_string),
            client_ip: "10.0.0.1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_text_then_query() {
        let f = fixture(100).await;
        let resp = f
            .upload
            .handle(upload("crash.log", "日志内容".as_bytes(), Some(ADMIN_PW)))
            .await
            .unwrap();
        assert_eq!(resp.ext, ".log");
        assert_eq!(resp.id.len(), 16);
        assert_eq!(resp.link, format!("https://tts.hapx.one/logshare?id={}", resp.id));

        let encrypted = f.query.handle(query(&resp.id, Some(ADMIN_PW))).await.unwrap();
        let plain: Value = decrypt_payload(&encrypted, ADMIN_PW, KeyDerivation::Pbkdf2).unwrap();
        assert_eq!(plain["content"], "日志内容");
        assert_eq!(plain["ext"], ".log");
        assert!(plain.get("encoding").is_none());
    }

    #[tokio::test]
    async fn test_upload_binary_then_query_base64() {
        let f = fixture(100).await;
        let data = [0u8, 159, 146, 150];
        let resp = f
            .upload
            .handle(upload("dump.BIN", &data, Some(ADMIN_PW)))
            .await
            .unwrap();
        assert_eq!(resp.ext, ".bin");

        let encrypted = f.query.handle(query(&resp.id, Some(ADMIN_PW))).await.unwrap();
        let plain: Value = decrypt_payload(&encrypted, ADMIN_PW, KeyDerivation::Pbkdf2).unwrap();
        assert_eq!(plain["encoding"], "base64");
        assert_eq!(plain["ext"], ".bin");
        assert_eq!(plain["content"], BASE64.encode(data));
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let f = fixture(100).await;

        let missing = f
            .upload
            .handle(UploadShareLog {
                file: None,
                admin_password: Some(ADMIN_PW.to_string()),
                client_ip: "10.0.0.1".to_string(),
            })
            .await;
        assert!(matches!(missing, Err(ApplicationError::ValidationError(m)) if m == "缺少参数"));

        let big = vec![b'a'; 25601];
        let too_large = f.upload.handle(upload("big.txt", &big, Some(ADMIN_PW))).await;
        assert!(matches!(too_large, Err(ApplicationError::ValidationError(m)) if m == "文件内容过大"));

        let exact = vec![b'a'; 25600];
        assert!(f.upload.handle(upload("ok.txt", &exact, Some(ADMIN_PW))).await.is_ok());

        let wrong = f.upload.handle(upload("a.txt", b"x", Some("nope"))).await;
        assert!(matches!(wrong, Err(ApplicationError::Forbidden(m)) if m == BAD_ADMIN_PASSWORD));
    }

    #[tokio::test]
    async fn test_query_rejections() {
        let f = fixture(100).await;

        let missing = f.query.handle(query("abcd", None)).await;
        assert!(matches!(missing, Err(ApplicationError::ValidationError(m)) if m == "缺少管理员密码"));

        let wrong = f.query.handle(query("abcd", Some("nope"))).await;
        assert!(matches!(wrong, Err(ApplicationError::Forbidden(_))));

        let unknown = f.query.handle(query("abcdef0123456789", Some(ADMIN_PW))).await;
        assert!(matches!(unknown, Err(ApplicationError::NotFound(m)) if m == NOT_FOUND));

        let traversal = f.query.handle(query("../etc", Some(ADMIN_PW))).await;
        assert!(matches!(traversal, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_requires_admin_and_is_encrypted_with_token() {
        let f = fixture(100).await;
        let text = f
            .upload
            .handle(upload("a.md", b"# title", Some(ADMIN_PW)))
            .await
            .unwrap();
        let binary = f
            .upload
            .handle(upload("b.png", b"\x89PNG", Some(ADMIN_PW)))
            .await
            .unwrap();

        let denied = f
            .list
            .handle(ListShareLogs {
                authorization: Some(format!("Bearer {}", f.user_token)),
                client_ip: "10.0.0.1".to_string(),
            })
            .await;
        assert!(matches!(denied, Err(ApplicationError::Forbidden(m)) if m == "需要管理员权限"));

        let anonymous = f
            .list
            .handle(ListShareLogs {
                authorization: None,
                client_ip: "10.0.0.1".to_string(),
            })
            .await;
        assert!(matches!(anonymous, Err(ApplicationError::Unauthorized(_))));

        let encrypted = f
            .list
            .handle(ListShareLogs {
                authorization: Some(format!("Bearer {}", f.admin_token)),
                client_ip: "10.0.0.1".to_string(),
            })
            .await
            .unwrap();
        let plain: Value =
            decrypt_payload(&encrypted, &f.admin_token, KeyDerivation::Pbkdf2).unwrap();
        let logs = plain["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["id"], text.id.as_str());
        assert_eq!(logs[0]["size"], 7);
        assert_eq!(logs[1]["id"], binary.id.as_str());
        assert_eq!(logs[1]["ext"], ".png");
        assert_eq!(logs[1]["size"], 4);
    }

    #[tokio::test]
    async fn test_rate_limit_shared_across_operations() {
        let f = fixture(2).await;
        f.upload
            .handle(upload("a.txt", b"x", Some(ADMIN_PW)))
            .await
            .unwrap();
        let _ = f.query.handle(query("abcd", Some(ADMIN_PW))).await;

        let limited = f.query.handle(query("abcd", Some(ADMIN_PW))).await;
        assert!(matches!(limited, Err(ApplicationError::TooManyRequests(_))));

        let other_ip = f
            .query
            .handle(QueryShareLog {
                id: "abcd".to_string(),
                admin_password: Some(ADMIN_PW.to_string()),
                client_ip: "10.0.0.2".to_string(),
            })
            .await;
        assert!(matches!(other_ip, Err(ApplicationError::NotFound(_))));
    }
}
