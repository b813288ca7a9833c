//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod share_repo;
mod user_repo;

pub use database::*;
pub use share_repo::*;
pub use user_repo::*;
