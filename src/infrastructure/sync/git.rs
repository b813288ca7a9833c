//! git 子进程封装

use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::SyncError;

/// 用 `***` 替换文本中出现的密钥
pub fn redact(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(s) if !s.is_empty() => text.replace(s, "***"),
        _ => text.to_string(),
    }
}

/// 在指定目录下执行 git 命令
///
/// 参数、输出与错误中出现的 token 一律脱敏后再记录
pub struct GitRunner {
    work_dir: PathBuf,
    secret: Option<String>,
}

impl GitRunner {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// 执行 `git <args>`，返回 stdout
    pub async fn run(&self, args: &[&str]) -> Result<String, SyncError> {
        let shown = redact(&args.join(" "), self.secret.as_deref());
        tracing::debug!(dir = %self.work_dir.display(), command = %shown, "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|e| SyncError::Spawn(format!("git {}: {}", shown, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::Git {
                command: shown,
                code: output.status.code(),
                stderr: redact(stderr.trim(), self.secret.as_deref()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
