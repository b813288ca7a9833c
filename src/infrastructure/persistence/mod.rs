//! Persistence Layer - 数据持久化
//!
//! 用户与文本类 LogShare 记录存 SQLite

pub mod sqlite;

pub use self::sqlite::{SqliteShareTextRepository, SqliteUserRepository};
