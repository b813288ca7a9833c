//! Happy-TTS - 文本转语音服务端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - User Context: 用户、二次验证、每日配额
//! - LogShare Context: 日志分享文件
//! - Speech: 模型、音色、格式等值对象
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, ShareBlobStorage, AudioStorage, TtsEngine, EmailSender, Guards）
//! - Commands / Queries: CQRS 处理器
//! - Security: AES-CBC 响应加密、TOTP、JWT、密码哈希
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API (axum)
//! - Memory: 验证码暂存、滑动窗口限流
//! - Persistence: SQLite 存储
//! - Adapters: OpenAI TTS Client, 邮件发送, 文件存储
//! - Sync: 上游仓库镜像工具

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{load_config, AppConfig};
