//! Storage Adapter - 文件系统存储实现

mod audio_storage;
mod share_storage;

pub use audio_storage::FsAudioStorage;
pub use share_storage::FsShareBlobStorage;
