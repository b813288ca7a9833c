//! LogShare Context - 日志分享限界上下文
//!
//! 职责:
//! - 分享文件 ID 与扩展名规则
//! - 文本/二进制存储分流
//! - 列表合并排序

mod entities;
mod value_objects;

pub use entities::{merge_share_logs, ShareBlobInfo, ShareLogEntry, ShareTextRecord};
pub use value_objects::{FileExt, ShareFileId};
