//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::security::KeyDerivation;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// LogShare 配置
    #[serde(default)]
    pub logshare: LogShareConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 邮件配置
    #[serde(default)]
    pub email: EmailConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 API Base URL
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 前端站点地址（用于生成 LogShare 分享链接）
    #[serde(default = "default_public_site_url")]
    pub public_site_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_site_url() -> String {
    "https://tts.hapx.one".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            public_site_url: default_public_site_url(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            let host = if self.host == "0.0.0.0" {
                "localhost"
            } else {
                &self.host
            };
            format!("http://{}:{}", host, self.port)
        })
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/happy-tts.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 数据根目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LogShare 二进制文件目录
    #[serde(default = "default_sharelogs_dir")]
    pub sharelogs_dir: PathBuf,

    /// 合成音频输出目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_sharelogs_dir() -> PathBuf {
    PathBuf::from("data/sharelogs")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/finish")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sharelogs_dir: default_sharelogs_dir(),
            audio_dir: default_audio_dir(),
        }
    }
}

/// 认证配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT 签名密钥
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// JWT 有效期（秒）
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_secs: u64,

    /// 二次验证临时令牌有效期（秒）
    #[serde(default = "default_two_factor_ttl")]
    pub two_factor_ttl_secs: u64,

    /// 邮箱验证码有效期（秒）
    #[serde(default = "default_email_code_ttl")]
    pub email_code_ttl_secs: u64,

    /// 允许注册的邮箱域名
    #[serde(default = "default_allowed_email_domains")]
    pub allowed_email_domains: Vec<String>,

    /// 启动时引导创建的管理员
    #[serde(default)]
    pub admin_username: Option<String>,

    #[serde(default)]
    pub admin_email: Option<String>,

    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_jwt_secret() -> String {
    "happy-tts-dev-secret".to_string()
}

fn default_jwt_ttl() -> u64 {
    2 * 60 * 60
}

fn default_two_factor_ttl() -> u64 {
    5 * 60
}

fn default_email_code_ttl() -> u64 {
    5 * 60
}

fn default_allowed_email_domains() -> Vec<String> {
    [
        "gmail.com",
        "outlook.com",
        "qq.com",
        "163.com",
        "126.com",
        "hotmail.com",
        "yahoo.com",
        "icloud.com",
        "foxmail.com",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_secs: default_jwt_ttl(),
            two_factor_ttl_secs: default_two_factor_ttl(),
            email_code_ttl_secs: default_email_code_ttl(),
            allowed_email_domains: default_allowed_email_domains(),
            admin_username: None,
            admin_email: None,
            admin_password: None,
        }
    }
}

/// LogShare 配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogShareConfig {
    /// 单个文件内容上限（字节）
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// 上传请求中文件字段的硬上限（字节）
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// 每个 IP 窗口内最大请求数
    #[serde(default = "default_logshare_rate_max")]
    pub rate_limit_max: u32,

    /// 限流窗口（秒）
    #[serde(default = "default_logshare_rate_window")]
    pub rate_limit_window_secs: u64,

    /// 响应加密的密钥派生方式
    #[serde(default)]
    pub key_derivation: KeyDerivation,
}

fn default_max_file_bytes() -> u64 {
    25600
}

fn default_max_upload_bytes() -> u64 {
    25600 * 2
}

fn default_logshare_rate_max() -> u32 {
    10
}

fn default_logshare_rate_window() -> u64 {
    60
}

impl Default for LogShareConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_upload_bytes: default_max_upload_bytes(),
            rate_limit_max: default_logshare_rate_max(),
            rate_limit_window_secs: default_logshare_rate_window(),
            key_derivation: KeyDerivation::default(),
        }
    }
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// OpenAI 兼容 API 基础 URL
    #[serde(default = "default_tts_url")]
    pub api_url: String,

    /// API 密钥
    #[serde(default)]
    pub api_key: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,

    /// 全局限流：窗口内最大调用次数
    #[serde(default = "default_tts_rate_max")]
    pub rate_limit_max: u32,

    /// 全局限流窗口（秒）
    #[serde(default = "default_tts_rate_window")]
    pub rate_limit_window_secs: u64,

    /// 普通用户每日可用次数
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

fn default_tts_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

fn default_tts_rate_max() -> u32 {
    5
}

fn default_tts_rate_window() -> u64 {
    30
}

fn default_daily_limit() -> u32 {
    5
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: default_tts_url(),
            api_key: String::new(),
            timeout_secs: default_tts_timeout(),
            max_retries: 0,
            rate_limit_max: default_tts_rate_max(),
            rate_limit_window_secs: default_tts_rate_window(),
            daily_limit: default_daily_limit(),
        }
    }
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// 是否真正发送邮件（关闭时仅记录日志）
    #[serde(default)]
    pub enabled: bool,

    /// 邮件服务 API 地址
    #[serde(default = "default_email_api_url")]
    pub api_url: String,

    /// 邮件服务 API 密钥
    #[serde(default)]
    pub api_key: String,

    /// 发件人
    #[serde(default = "default_email_from")]
    pub from: String,
}

fn default_email_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_email_from() -> String {
    "noreply@hapxs.com".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_email_api_url(),
            api_key: String::new(),
            from: default_email_from(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "data/happy-tts.db");
        assert_eq!(config.logshare.max_file_bytes, 25600);
        assert_eq!(config.logshare.rate_limit_max, 10);
        assert_eq!(config.tts.rate_limit_max, 5);
        assert_eq!(config.auth.allowed_email_domains.len(), 9);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.public_base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/happy-tts.db?mode=rwc");
    }
}
