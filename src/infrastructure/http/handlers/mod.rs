//! HTTP Handlers

mod auth;
mod logshare;
mod ping;
mod tts;
mod two_factor;

pub use auth::*;
pub use logshare::*;
pub use ping::*;
pub use tts::*;
pub use two_factor::*;
