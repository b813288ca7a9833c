//! 仓库同步
//!
//! 克隆上游仓库，镜像到本地检出（保留排除项），提交并强制推送到目标仓库

mod git;
mod repo_sync;

pub use git::{redact, GitRunner};
pub use repo_sync::{mirror_entries, RepoSync, SyncError, SyncOptions, DEFAULT_EXCLUDED};
