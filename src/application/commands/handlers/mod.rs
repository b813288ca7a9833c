//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod auth_handlers;
mod logshare_handlers;
mod speech_handlers;
mod two_factor_handlers;

pub use auth_handlers::*;
pub use logshare_handlers::*;
pub use speech_handlers::*;
pub use two_factor_handlers::*;
