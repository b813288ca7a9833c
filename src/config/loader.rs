//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `HAPPY_TTS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `HAPPY_TTS_SERVER__PORT=3000`
/// - `HAPPY_TTS_AUTH__JWT_SECRET=change-me`
/// - `HAPPY_TTS_TTS__API_KEY=sk-...`
/// - `HAPPY_TTS_LOGSHARE__KEY_DERIVATION=sha256`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值由 serde(default) 提供，这里只覆盖需要显式声明的键
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.path", "data/happy-tts.db")?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: HAPPY_TTS_TTS__API_URL=https://api.openai.com/v1
    builder = builder.add_source(
        Environment::with_prefix("HAPPY_TTS")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("auth.allowed_email_domains")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.auth.jwt_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "JWT secret cannot be empty".to_string(),
        ));
    }

    if config.auth.jwt_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "JWT ttl cannot be 0".to_string(),
        ));
    }

    if config.logshare.rate_limit_max == 0 || config.logshare.rate_limit_window_secs == 0 {
        return Err(ConfigError::ValidationError(
            "LogShare rate limit must be positive".to_string(),
        ));
    }

    if config.logshare.max_file_bytes > config.logshare.max_upload_bytes {
        return Err(ConfigError::ValidationError(
            "LogShare max_file_bytes cannot exceed max_upload_bytes".to_string(),
        ));
    }

    if config.tts.rate_limit_max == 0 || config.tts.rate_limit_window_secs == 0 {
        return Err(ConfigError::ValidationError(
            "TTS rate limit must be positive".to_string(),
        ));
    }

    if config.email.enabled && config.email.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "Email api_key is required when email is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Public Site URL: {}", config.server.public_site_url);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("ShareLogs Directory: {:?}", config.storage.sharelogs_dir);
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!("JWT TTL: {}s", config.auth.jwt_ttl_secs);
    tracing::info!(
        "LogShare: max_file={}B, rate={}/{}s, kdf={:?}",
        config.logshare.max_file_bytes,
        config.logshare.rate_limit_max,
        config.logshare.rate_limit_window_secs,
        config.logshare.key_derivation
    );
    tracing::info!("TTS API: {}", config.tts.api_url);
    tracing::info!("TTS API Key Set: {}", !config.tts.api_key.is_empty());
    tracing::info!(
        "TTS Rate: {}/{}s, daily limit {}",
        config.tts.rate_limit_max,
        config.tts.rate_limit_window_secs,
        config.tts.daily_limit
    );
    tracing::info!("Email Enabled: {}", config.email.enabled);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_jwt_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_file_limit_over_upload_limit() {
        let mut config = AppConfig::default();
        config.logshare.max_file_bytes = config.logshare.max_upload_bytes + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_email_without_key() {
        let mut config = AppConfig::default();
        config.email.enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
