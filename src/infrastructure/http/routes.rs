//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                          GET   健康检查
//! - /api/auth/register                 POST  注册
//! - /api/auth/verify-email             POST  邮箱验证
//! - /api/auth/login                    POST  登录
//! - /api/auth/me                       GET   当前用户
//! - /api/auth/passkey-verify           POST  Passkey 二次验证
//! - /api/auth/logout                   POST  登出
//! - /api/user/verify                   POST  TOTP / Passkey 二次验证
//! - /api/totp/{setup,enable,disable}   POST  TOTP 管理
//! - /api/passkey/credentials           GET   列出凭证 / POST 注册凭证
//! - /api/passkey/credentials/remove    POST  删除凭证
//! - /api/sharelog                      POST  上传日志（multipart）
//! - /api/sharelog/all                  GET   日志列表（加密）
//! - /api/sharelog/:id                  POST  查询日志（加密）
//! - /api/tts/generate                  POST  合成语音
//! - /api/tts/audio/:file               GET   下载音频

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// multipart 边界与其他字段的余量
const MULTIPART_OVERHEAD: usize = 16 * 1024;

/// 创建所有路由
///
/// `max_upload_bytes` 为日志上传请求中文件的硬上限
pub fn create_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes(max_upload_bytes))
}

/// API 路由
fn api_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/auth", auth_routes())
        .route("/user/verify", post(handlers::verify_user))
        .nest("/totp", totp_routes())
        .nest("/passkey", passkey_routes())
        .nest("/sharelog", sharelog_routes(max_upload_bytes))
        .nest("/tts", tts_routes())
}

/// Auth 路由
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/verify-email", post(handlers::verify_email))
        .route("/login", post(handlers::login))
        .route("/me", get(handlers::me))
        .route("/passkey-verify", post(handlers::passkey_verify))
        .route("/logout", post(handlers::logout))
}

/// TOTP 路由
fn totp_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/setup", post(handlers::totp_setup))
        .route("/enable", post(handlers::totp_enable))
        .route("/disable", post(handlers::totp_disable))
}

/// Passkey 路由
fn passkey_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/credentials",
            get(handlers::list_passkeys).post(handlers::register_passkey),
        )
        .route("/credentials/remove", post(handlers::remove_passkey))
}

/// LogShare 路由
fn sharelog_routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(handlers::upload_share_log)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
        .route("/all", get(handlers::list_share_logs))
        .route("/:id", post(handlers::query_share_log))
}

/// TTS 路由
fn tts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_speech))
        .route("/audio/:file_name", get(handlers::get_audio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::security::{decrypt_payload, hash_password, KeyDerivation};
    use crate::application::VerificationCodeStorePort;
    use crate::config::AppConfig;
    use crate::domain::user::{Email, Role, User, Username};
    use crate::infrastructure::adapters::{
        FakeTtsClient, FsAudioStorage, FsShareBlobStorage, RecordingEmailSender,
    };
    use crate::infrastructure::http::server::build_router;
    use crate::infrastructure::http::state::{AppPorts, AppState};
    use crate::infrastructure::memory::{InMemoryVerificationCodeStore, SlidingWindowRateLimiter};
    use crate::infrastructure::persistence::sqlite::{
        create_test_pool, SqliteShareTextRepository, SqliteUserRepository,
    };
    use crate::application::UserRepositoryPort;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    const ADMIN_PW: &str = "root-pass";
    const BOUNDARY: &str = "----happyttsboundary";

    struct TestApp {
        _dir: TempDir,
        router: Router,
        codes: Arc<InMemoryVerificationCodeStore>,
        mail: Arc<RecordingEmailSender>,
    }

    async fn app() -> TestApp {
        let dir = TempDir::new().unwrap();
        let pool = create_test_pool().await.unwrap();
        let config = AppConfig::default();

        let user_repo: Arc<dyn UserRepositoryPort> =
            Arc::new(SqliteUserRepository::new(pool.clone()));
        let admin = User::new(
            Username::new("admin").unwrap(),
            Email::from_trusted("admin@gmail.com"),
            hash_password(ADMIN_PW).unwrap(),
            Role::Admin,
        );
        user_repo.insert(&admin).await.unwrap();

        let codes = Arc::new(InMemoryVerificationCodeStore::new());
        let mail = Arc::new(RecordingEmailSender::new());
        let ports = AppPorts {
            user_repo,
            share_text_repo: Arc::new(SqliteShareTextRepository::new(pool)),
            share_blob_storage: Arc::new(FsShareBlobStorage::new(dir.path().join("sharelogs"))),
            audio_storage: Arc::new(FsAudioStorage::new(dir.path().join("finish"))),
            tts_engine: Arc::new(FakeTtsClient::new()),
            email_sender: mail.clone(),
            verification_codes: codes.clone(),
            logshare_limiter: Arc::new(SlidingWindowRateLimiter::new(100, Duration::from_secs(60))),
            tts_limiter: Arc::new(SlidingWindowRateLimiter::new(100, Duration::from_secs(30))),
        };

        let state = Arc::new(AppState::new(ports, &config));
        TestApp {
            _dir: dir,
            router: build_router(state, config.logshare.max_upload_bytes as usize),
            codes,
            mail,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn multipart_upload(file_name: &str, data: &[u8], password: &str) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"adminPassword\"\r\n\r\n{pw}\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                b = BOUNDARY,
                pw = password,
                f = file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/sharelog")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn login(router: &Router, identifier: &str, password: &str) -> String {
        let (status, body) = send(
            router,
            post_json(
                "/api/auth/login",
                json!({"identifier": identifier, "password": password}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = app().await;
        let (status, body) = send(&app.router, get("/api/ping", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_verify_login_me() {
        let app = app().await;
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/auth/register",
                json!({"username": "alice", "email": "alice@gmail.com", "password": "pw123456"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"needVerify": true}));
        assert_eq!(app.mail.sent().len(), 1);

        let (status, body) = send(
            &app.router,
            post_json(
                "/api/auth/verify-email",
                json!({"email": "alice@gmail.com", "code": "wrong"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "验证码错误");

        let code = app.codes.get("alice@gmail.com").unwrap();
        let (status, body) = send(
            &app.router,
            post_json(
                "/api/auth/verify-email",
                json!({"email": "alice@gmail.com", "code": code}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let token = login(&app.router, "alice@gmail.com", "pw123456").await;
        let (status, body) = send(&app.router, get("/api/auth/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["emailVerified"], true);
        assert_eq!(body["remainingUsage"], 5);
        assert!(body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let app = app().await;
        let (status, body) = send(&app.router, get("/api/auth/me", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "未登录"}));

        let (status, body) = send(&app.router, get("/api/auth/me", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "认证令牌无效");

        let (status, body) = send(
            &app.router,
            post_json("/api/auth/login", json!({"identifier": "admin", "password": "x"}), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "用户名/邮箱或密码错误");

        let (status, body) = send(
            &app.router,
            post_json("/api/auth/logout", json!({}), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_passkey_login_requires_second_factor() {
        let app = app().await;
        let token = login(&app.router, "admin", ADMIN_PW).await;

        let (status, _) = send(
            &app.router,
            post_json(
                "/api/passkey/credentials",
                json!({"credentialId": "cred-abcdef-123456", "name": "laptop"}),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app.router, get("/api/passkey/credentials", Some(&token))).await;
        assert_eq!(body["credentials"][0]["credentialID"], "cred-abcdef-123456");

        let (status, body) = send(
            &app.router,
            post_json("/api/auth/login", json!({"identifier": "admin", "password": ADMIN_PW}), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requires2FA"], true);
        assert_eq!(body["twoFactorType"], json!(["Passkey"]));

        let (status, body) = send(
            &app.router,
            post_json(
                "/api/auth/passkey-verify",
                json!({"username": "admin", "passkeyCredentialId": "cred-abcdef-123456"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["username"], "admin");

        let fresh = body["token"].as_str().unwrap();
        let (status, _) = send(&app.router, get("/api/auth/me", Some(fresh))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sharelog_upload_list_query() {
        let app = app().await;

        let (status, body) = send(
            &app.router,
            multipart_upload("crash.log", "hello log".as_bytes(), ADMIN_PW),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["ext"], ".log");

        let (status, body) = send(
            &app.router,
            multipart_upload("crash.log", b"x", "wrong"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "管理员密码错误");

        let (status, body) = send(
            &app.router,
            post_json(
                &format!("/api/sharelog/{}", id),
                json!({"adminPassword": ADMIN_PW}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let encrypted = serde_json::from_value(body).unwrap();
        let plain: Value = decrypt_payload(&encrypted, ADMIN_PW, KeyDerivation::Pbkdf2).unwrap();
        assert_eq!(plain["content"], "hello log");

        let (status, body) = send(
            &app.router,
            post_json("/api/sharelog/zzzz", json!({"adminPassword": ADMIN_PW}), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "日志不存在");

        let token = login(&app.router, "admin", ADMIN_PW).await;
        let (status, body) = send(&app.router, get("/api/sharelog/all", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        let encrypted = serde_json::from_value(body).unwrap();
        let plain: Value = decrypt_payload(&encrypted, &token, KeyDerivation::Pbkdf2).unwrap();
        assert_eq!(plain["logs"][0]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_sharelog_upload_over_hard_limit() {
        let app = app().await;
        let big = vec![b'a'; 25600 * 2 + 32 * 1024];
        let (status, body) = send(&app.router, multipart_upload("big.log", &big, ADMIN_PW)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "文件内容过大");
    }

    #[tokio::test]
    async fn test_tts_generate_and_download() {
        let app = app().await;
        let token = login(&app.router, "admin", ADMIN_PW).await;

        let (status, body) = send(
            &app.router,
            post_json(
                "/api/tts/generate",
                json!({"text": "你好", "voice": "alloy", "outputFormat": "flac"}),
                Some(&token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["cached"], false);
        let url = body["audioUrl"].as_str().unwrap().to_string();
        assert!(url.ends_with(".flac"));

        let response = app.router.clone().oneshot(get(&url, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/flac");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"FAKE-flac:"));

        let (status, body) = send(
            &app.router,
            post_json("/api/tts/generate", json!({"text": "x", "voice": "bogus"}), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "不支持的音色: bogus");

        let (status, _) = send(&app.router, get("/api/tts/audio/missing.mp3", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tts_requires_login() {
        let app = app().await;
        let (status, _) = send(
            &app.router,
            post_json("/api/tts/generate", json!({"text": "hi"}), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
