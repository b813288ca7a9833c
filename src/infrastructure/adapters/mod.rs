//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod email;
pub mod storage;
pub mod tts;

pub use email::*;
pub use storage::*;
pub use tts::*;
