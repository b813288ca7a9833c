//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod auth_commands;
mod logshare_commands;
mod speech_commands;
mod two_factor_commands;

pub mod handlers;

pub use auth_commands::*;
pub use logshare_commands::*;
pub use speech_commands::*;
pub use two_factor_commands::*;
