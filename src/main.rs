//! Happy-TTS 服务端
//!
//! - Domain: user/, logshare/, speech/
//! - Application: commands, queries, ports, security
//! - Infrastructure: http, memory, persistence, adapters

use std::sync::Arc;
use std::time::Duration;

use happy_tts::application::{EmailSenderPort, EnsureAdminHandler, UserRepositoryPort};
use happy_tts::config::{load_config, print_config, AppConfig};
use happy_tts::infrastructure::adapters::{
    FsAudioStorage, FsShareBlobStorage, HttpEmailSender, HttpEmailSenderConfig,
    LoggingEmailSender, OpenAiTtsClient, OpenAiTtsClientConfig,
};
use happy_tts::infrastructure::http::{AppPorts, AppState, HttpServer, ServerConfig};
use happy_tts::infrastructure::memory::{InMemoryVerificationCodeStore, SlidingWindowRateLimiter};
use happy_tts::infrastructure::persistence::sqlite::{create_pool, run_migrations, PoolConfig};
use happy_tts::infrastructure::persistence::{SqliteShareTextRepository, SqliteUserRepository};

/// 内存态（限流窗口、过期验证码）清理周期
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},happy_tts={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Happy-TTS server v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.data_dir).await?;
    tokio::fs::create_dir_all(&config.storage.audio_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let pool = create_pool(&PoolConfig::from(&config.database)).await?;
    run_migrations(&pool).await?;

    let user_repo: Arc<dyn UserRepositoryPort> =
        Arc::new(SqliteUserRepository::new(pool.clone()));
    let share_text_repo = Arc::new(SqliteShareTextRepository::new(pool));

    if EnsureAdminHandler::new(user_repo.clone())
        .handle(&config.auth)
        .await?
    {
        tracing::info!("Bootstrap admin account created");
    }

    // TTS 后端
    let tts_engine = Arc::new(OpenAiTtsClient::new(OpenAiTtsClientConfig::from(&config.tts))?);

    // 邮件：未启用时只记录日志
    let email_sender: Arc<dyn EmailSenderPort> = if config.email.enabled {
        Arc::new(HttpEmailSender::new(HttpEmailSenderConfig::from(&config.email))?)
    } else {
        tracing::warn!("Email delivery disabled, verification codes are only logged");
        Arc::new(LoggingEmailSender)
    };

    // 进程内守卫
    let verification_codes = Arc::new(InMemoryVerificationCodeStore::new());
    let logshare_limiter = Arc::new(SlidingWindowRateLimiter::new(
        config.logshare.rate_limit_max,
        Duration::from_secs(config.logshare.rate_limit_window_secs),
    ));
    let tts_limiter = Arc::new(SlidingWindowRateLimiter::new(
        config.tts.rate_limit_max,
        Duration::from_secs(config.tts.rate_limit_window_secs),
    ));

    {
        let codes = verification_codes.clone();
        let limiters = [logshare_limiter.clone(), tts_limiter.clone()];
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PURGE_INTERVAL);
            loop {
                ticker.tick().await;
                let codes_purged = codes.purge_expired();
                let keys_purged: usize = limiters.iter().map(|l| l.purge_idle()).sum();
                if codes_purged + keys_purged > 0 {
                    tracing::debug!(codes_purged, keys_purged, "Purged in-memory state");
                }
            }
        });
    }

    let ports = AppPorts {
        user_repo,
        share_text_repo,
        share_blob_storage: Arc::new(FsShareBlobStorage::new(&config.storage.sharelogs_dir)),
        audio_storage: Arc::new(FsAudioStorage::new(&config.storage.audio_dir)),
        tts_engine,
        email_sender,
        verification_codes,
        logshare_limiter,
        tts_limiter,
    };
    let state = AppState::new(ports, &config);

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_upload_bytes(config.logshare.max_upload_bytes as usize);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
