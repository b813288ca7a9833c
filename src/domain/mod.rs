//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - User Context: 用户与二次验证
//! - LogShare Context: 日志/文件分享
//! - Speech Context: 语音合成参数

pub mod logshare;
pub mod speech;
pub mod user;
