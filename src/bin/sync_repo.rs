//! sync-repo - 把上游 Happy-TTS 仓库镜像到本地检出并强制推送到目标仓库
//!
//! 用法：`sync-repo [TOKEN]`，token 也可由 `GITHUB_TOKEN` 提供

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use happy_tts::infrastructure::sync::{RepoSync, SyncOptions, DEFAULT_EXCLUDED};

#[derive(Parser)]
#[command(name = "sync-repo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// GitHub token，用于推送
    #[arg(env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// 上游仓库克隆地址
    #[arg(long, default_value = "https://github.com/Happy-clo/Happy-TTS.git")]
    source: String,

    /// 推送目标 owner/repo
    #[arg(long, default_value = "Happy-clo/OpenAI-TTS-Gradio")]
    target: String,

    #[arg(long, default_value = "main")]
    branch: String,

    /// 本地仓库目录
    #[arg(long, value_name = "DIR", default_value = ".")]
    local: PathBuf,

    /// 上游克隆临时目录（默认系统临时目录下的 repo-sync-tmp）
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    #[arg(long, default_value = "Happy-clo")]
    user_name: String,

    #[arg(long, default_value = "happycloo@outlook.com")]
    user_email: String,

    #[arg(long, default_value = "chore: 同步 Happy-TTS 仓库内容（自动同步脚本提交）")]
    message: String,

    /// 日志级别
    #[arg(long, env = "SYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let Some(token) = cli.token.filter(|t| !t.trim().is_empty()) else {
        eprintln!("请提供 GitHub Token 作为参数或环境变量 GITHUB_TOKEN");
        std::process::exit(1);
    };

    let options = SyncOptions {
        source_url: cli.source,
        target_repo: cli.target,
        branch: cli.branch,
        local_repo: cli.local,
        temp_dir: cli
            .temp_dir
            .unwrap_or_else(|| std::env::temp_dir().join("repo-sync-tmp")),
        user_name: cli.user_name,
        user_email: cli.user_email,
        commit_message: cli.message,
        excluded: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
    };

    RepoSync::new(options, token)?
        .run()
        .await
        .context("同步失败")?;

    tracing::info!("同步完成并强制推送");
    Ok(())
}
