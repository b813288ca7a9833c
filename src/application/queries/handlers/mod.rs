//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod audio_handlers;
mod logshare_handlers;
mod user_handlers;

pub use audio_handlers::*;
pub use logshare_handlers::*;
pub use user_handlers::*;
