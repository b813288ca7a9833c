//! RepoSync - 上游仓库镜像与强制推送

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::git::{redact, GitRunner};

/// 本地与上游都不参与镜像的条目
pub const DEFAULT_EXCLUDED: [&str; 4] = [".github", ".git", "node_modules", "dist-obfuscated"];

/// 同步错误
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("缺少 GitHub Token")]
    MissingToken,

    #[error("无法启动 git: {0}")]
    Spawn(String),

    #[error("git {command} 失败 (exit {code:?}): {stderr}")]
    Git {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("文件操作失败: {0}")]
    Io(#[from] io::Error),

    #[error("后台任务失败: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// 同步参数
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// 上游克隆地址
    pub source_url: String,
    /// 推送目标 `<owner>/<repo>`
    pub target_repo: String,
    pub branch: String,
    /// 本地仓库检出目录
    pub local_repo: PathBuf,
    /// 上游克隆的临时目录
    pub temp_dir: PathBuf,
    pub user_name: String,
    pub user_email: String,
    pub commit_message: String,
    pub excluded: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            source_url: "https://github.com/Happy-clo/Happy-TTS.git".to_string(),
            target_repo: "Happy-clo/OpenAI-TTS-Gradio".to_string(),
            branch: "main".to_string(),
            local_repo: PathBuf::from("."),
            temp_dir: std::env::temp_dir().join("repo-sync-tmp"),
            user_name: "Happy-clo".to_string(),
            user_email: "happycloo@outlook.com".to_string(),
            commit_message: "chore: 同步 Happy-TTS 仓库内容（自动同步脚本提交）".to_string(),
            excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SyncOptions {
    /// 带 token 的推送地址
    pub fn remote_url(&self, token: &str) -> String {
        format!("https://{}@github.com/{}.git", token, self.target_repo)
    }
}

/// 仓库同步执行器
pub struct RepoSync {
    options: SyncOptions,
    token: String,
}

impl RepoSync {
    pub fn new(options: SyncOptions, token: impl Into<String>) -> Result<Self, SyncError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SyncError::MissingToken);
        }
        Ok(Self { options, token })
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// 执行完整同步流程
    pub async fn run(&self) -> Result<(), SyncError> {
        let opts = &self.options;

        self.clone_upstream().await?;

        let (local, temp, excluded) = (
            opts.local_repo.clone(),
            opts.temp_dir.clone(),
            opts.excluded.clone(),
        );
        let (removed, copied) =
            tokio::task::spawn_blocking(move || mirror_entries(&temp, &local, &excluded))
                .await??;
        tracing::info!(removed, copied, "Local checkout mirrored from upstream");

        let git = GitRunner::new(&opts.local_repo).with_secret(self.token.as_str());
        git.run(&["config", "user.name", opts.user_name.as_str()]).await?;
        git.run(&["config", "user.email", opts.user_email.as_str()]).await?;
        git.run(&["add", "."]).await?;
        git.run(&["commit", "--allow-empty", "-m", opts.commit_message.as_str()])
            .await?;

        let remote = opts.remote_url(&self.token);
        git.run(&["remote", "set-url", "origin", remote.as_str()]).await?;
        git.run(&["push", "-f", "origin", opts.branch.as_str()]).await?;

        tracing::info!(
            target = %opts.target_repo,
            branch = %opts.branch,
            remote = %redact(&remote, Some(&self.token)),
            "Sync pushed"
        );
        Ok(())
    }

    async fn clone_upstream(&self) -> Result<(), SyncError> {
        let opts = &self.options;
        match tokio::fs::remove_dir_all(&opts.temp_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let parent = opts
            .temp_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let dest = opts.temp_dir.to_string_lossy().to_string();

        GitRunner::new(parent)
            .with_secret(self.token.as_str())
            .run(&["clone", "--depth", "1", opts.source_url.as_str(), dest.as_str()])
            .await?;

        tracing::info!(source = %opts.source_url, dest = %dest, "Upstream cloned");
        Ok(())
    }
}

/// 用 `source` 的内容替换 `target`，两侧的排除项都不动
///
/// 返回 (删除条目数, 复制条目数)
pub fn mirror_entries(
    source: &Path,
    target: &Path,
    excluded: &[String],
) -> Result<(usize, usize), SyncError> {
    let is_excluded = |name: &OsStr| excluded.iter().any(|e| name == OsStr::new(e));

    // 先读完上游清单，读取失败时本地还未改动
    let mut upstream = Vec::new();
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        if !is_excluded(&entry.file_name()) {
            upstream.push(entry.file_name());
        }
    }

    let mut removed = 0;
    for entry in fs::read_dir(target)? {
        let entry = entry?;
        if is_excluded(&entry.file_name()) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
        removed += 1;
    }

    for name in &upstream {
        copy_recursive(&source.join(name), &target.join(name))?;
    }

    Ok((removed, upstream.len()))
}

/// 递归复制；符号链接原样重建，不跟随
fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(src)?.file_type();
    if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else if file_type.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(src, dest).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dest)
}

#[cfg(windows)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    if fs::metadata(src).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(link, dest)
    } else {
        std::os::windows::fs::symlink_file(link, dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_mirror_keeps_excluded_entries() {
        let upstream = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let excluded: Vec<String> = DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect();

        write(&upstream.path().join("README.md"), "new readme");
        write(&upstream.path().join("src/app.ts"), "export {}");
        write(&upstream.path().join(".github/workflows/ci.yml"), "upstream ci");

        write(&local.path().join("README.md"), "old readme");
        write(&local.path().join("stale.txt"), "stale");
        write(&local.path().join(".github/workflows/ci.yml"), "local ci");
        write(&local.path().join("node_modules/x/index.js"), "dep");

        let (removed, copied) = mirror_entries(upstream.path(), local.path(), &excluded).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(copied, 2);

        let read = |p: &str| fs::read_to_string(local.path().join(p)).unwrap();
        assert_eq!(read("README.md"), "new readme");
        assert_eq!(read("src/app.ts"), "export {}");
        assert_eq!(read(".github/workflows/ci.yml"), "local ci");
        assert_eq!(read("node_modules/x/index.js"), "dep");
        assert!(!local.path().join("stale.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_mirror_recreates_symlinks() {
        use std::os::unix::fs::symlink;

        let upstream = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let excluded: Vec<String> = DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect();

        write(&upstream.path().join("README.md"), "readme");
        write(&upstream.path().join("docs/guide.md"), "guide");
        symlink("does-not-exist", upstream.path().join("zlink")).unwrap();
        symlink("docs", upstream.path().join("docs-link")).unwrap();
        symlink(".", upstream.path().join("docs/loop")).unwrap();
        write(&local.path().join("keep.txt"), "old");

        let (removed, copied) = mirror_entries(upstream.path(), local.path(), &excluded).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(copied, 4);

        let target = local.path();
        assert_eq!(fs::read_link(target.join("zlink")).unwrap(), Path::new("does-not-exist"));
        assert_eq!(fs::read_link(target.join("docs-link")).unwrap(), Path::new("docs"));
        assert_eq!(fs::read_link(target.join("docs/loop")).unwrap(), Path::new("."));
        assert_eq!(fs::read_to_string(target.join("docs-link/guide.md")).unwrap(), "guide");
        assert_eq!(fs::read_to_string(target.join("README.md")).unwrap(), "readme");
    }

    #[test]
    fn test_missing_upstream_leaves_local_untouched() {
        let local = TempDir::new().unwrap();
        write(&local.path().join("keep.txt"), "keep");

        let missing = local.path().join("no-such-clone");
        assert!(mirror_entries(&missing, local.path(), &[]).is_err());
        assert!(local.path().join("keep.txt").exists());
    }

    #[test]
    fn test_remote_url() {
        let opts = SyncOptions::default();
        assert_eq!(
            opts.remote_url("tok"),
            "https://tok@github.com/Happy-clo/OpenAI-TTS-Gradio.git"
        );
        assert_eq!(opts.excluded.len(), 4);
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            RepoSync::new(SyncOptions::default(), "  "),
            Err(SyncError::MissingToken)
        ));
    }
}
