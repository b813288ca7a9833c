//! Speech Command Handlers

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::SynthesizeSpeech;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, RateLimiterPort, SpeechRequest, TtsEnginePort, UserRepositoryPort,
};
use crate::domain::speech::{is_reserved_file_name, normalize_file_name, SILENCE_FILE_NAME};

/// 全局限流使用的固定 key
const RATE_LIMIT_KEY: &str = "tts";

const RATE_LIMITED: &str = "超出请求频率限制，请稍后再试";
const BACKEND_FAILED: &str = "生成语音时出现错误，请检查API密钥并重试";

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechResponse {
    pub file_name: String,
    pub audio_url: String,
    /// 是否直接复用了已有文件（未调用后端）
    pub cached: bool,
}

impl SynthesizeSpeechResponse {
    fn new(file_name: String, cached: bool) -> Self {
        Self {
            audio_url: format!("/api/tts/audio/{}", file_name),
            file_name,
            cached,
        }
    }
}

/// 生成缓存文件名：md5(text|model|voice|format|speed).<ext>
pub fn cache_file_name(command: &SynthesizeSpeech) -> String {
    let key = format!(
        "{}|{}|{}|{}|{:.2}",
        command.text,
        command.model.as_str(),
        command.voice.as_str(),
        command.format.extension(),
        command.speed.value()
    );
    format!("{:x}.{}", md5::compute(key.as_bytes()), command.format.extension())
}

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    tts_engine: Arc<dyn TtsEnginePort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    user_repo: Arc<dyn UserRepositoryPort>,
    limiter: Arc<dyn RateLimiterPort>,
    daily_limit: u32,
}

impl SynthesizeSpeechHandler {
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        user_repo: Arc<dyn UserRepositoryPort>,
        limiter: Arc<dyn RateLimiterPort>,
        daily_limit: u32,
    ) -> Self {
        Self {
            tts_engine,
            audio_storage,
            user_repo,
            limiter,
            daily_limit,
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeSpeech,
    ) -> Result<SynthesizeSpeechResponse, ApplicationError> {
        if !self.limiter.try_acquire(RATE_LIMIT_KEY) {
            tracing::warn!(user_id = %command.user_id, "TTS rate limit exceeded");
            return Err(ApplicationError::too_many_requests(RATE_LIMITED));
        }

        let mut user = self
            .user_repo
            .find_by_id(&command.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("用户不存在"))?;

        let today = Utc::now().date_naive();
        if user.remaining_usage(self.daily_limit, today) == Some(0) {
            tracing::warn!(user_id = %user.id, limit = self.daily_limit, "Daily TTS quota exhausted");
            return Err(ApplicationError::forbidden("今日使用次数已达上限"));
        }

        if command.text.is_empty() {
            tracing::info!(user_id = %user.id, "Empty text, returning silence");
            return Ok(SynthesizeSpeechResponse::new(SILENCE_FILE_NAME.to_string(), true));
        }

        let custom = normalize_file_name(command.custom_file_name.as_deref(), command.format);
        let file_name = match custom {
            Some(name) if is_reserved_file_name(&name) => {
                tracing::warn!(user_id = %user.id, file = %name, "Custom file name collides with shared audio");
                return Err(ApplicationError::validation(format!("文件名不可用: {}", name)));
            }
            Some(name) => name,
            None => {
                let name = cache_file_name(&command);
                if self.audio_storage.exists(&name).await {
                    tracing::info!(user_id = %user.id, file = %name, "TTS cache hit");
                    return Ok(SynthesizeSpeechResponse::new(name, true));
                }
                name
            }
        };
        // 拒绝非法文件名要早于后端调用
        self.audio_storage.audio_path(&file_name)?;

        tracing::info!(
            user_id = %user.id,
            model = command.model.as_str(),
            voice = command.voice.as_str(),
            format = command.format.extension(),
            speed = command.speed.value(),
            chars = command.text.chars().count(),
            "Requesting speech synthesis"
        );

        let audio = self
            .tts_engine
            .synthesize(SpeechRequest {
                text: command.text.clone(),
                model: command.model,
                voice: command.voice,
                format: command.format,
                speed: command.speed,
            })
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Speech synthesis failed");
                ApplicationError::ExternalServiceError(BACKEND_FAILED.to_string())
            })?;

        let path = self.audio_storage.save(&file_name, &audio.data).await?;

        user.record_usage(today);
        self.user_repo.update(&user).await?;

        tracing::info!(
            user_id = %user.id,
            path = %path.display(),
            bytes = audio.data.len(),
            "Speech file written"
        );

        Ok(SynthesizeSpeechResponse::new(file_name, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::{AudioFormat, Speed, SpeechModel, SpeechVoice};
    use crate::domain::user::{Email, Role, User, Username};
    use crate::infrastructure::adapters::storage::FsAudioStorage;
    use crate::infrastructure::adapters::tts::FakeTtsClient;
    use crate::infrastructure::memory::SlidingWindowRateLimiter;
    use crate::infrastructure::persistence::sqlite::{create_test_pool, SqliteUserRepository};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        engine: Arc<FakeTtsClient>,
        storage: Arc<FsAudioStorage>,
        users: Arc<dyn UserRepositoryPort>,
        handler: SynthesizeSpeechHandler,
        user: User,
    }

    async fn fixture(engine: FakeTtsClient, rate_max: u32, daily_limit: u32, role: Role) -> Fixture {
        let dir = TempDir::new().unwrap();
        let pool = create_test_pool().await.unwrap();
        let users: Arc<dyn UserRepositoryPort> = Arc::new(SqliteUserRepository::new(pool));
        let user = User::new(
            Username::new("vic").unwrap(),
            Email::from_trusted("vic@gmail.com"),
            "hash".to_string(),
            role,
        );
        users.insert(&user).await.unwrap();

        let engine = Arc::new(engine);
        let storage = Arc::new(FsAudioStorage::new(dir.path().join("finish")));
        let limiter = Arc::new(SlidingWindowRateLimiter::new(rate_max, Duration::from_secs(30)));
        let handler = SynthesizeSpeechHandler::new(
            engine.clone(),
            storage.clone(),
            users.clone(),
            limiter,
            daily_limit,
        );

        Fixture {
            _dir: dir,
            engine,
            storage,
            users,
            handler,
            user,
        }
    }

    fn command(user: &User, text: &str) -> SynthesizeSpeech {
        SynthesizeSpeech {
            user_id: user.id.to_string(),
            text: text.to_string(),
            model: SpeechModel::default(),
            voice: SpeechVoice::default(),
            format: AudioFormat::Mp3,
            speed: Speed::default(),
            custom_file_name: None,
        }
    }

    #[tokio::test]
    async fn test_synthesize_writes_file_and_reuses_cache() {
        let f = fixture(FakeTtsClient::new(), 10, 5, Role::User).await;

        let first = f.handler.handle(command(&f.user, "你好")).await.unwrap();
        assert!(!first.cached);
        assert!(first.file_name.ends_with(".mp3"));
        assert_eq!(first.audio_url, format!("/api/tts/audio/{}", first.file_name));
        assert!(f.storage.exists(&first.file_name).await);

        let second = f.handler.handle(command(&f.user, "你好")).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.file_name, first.file_name);
        assert_eq!(f.engine.call_count(), 1);

        let stored = f.users.find_by_id(f.user.id.as_str()).await.unwrap().unwrap();
        assert_eq!(stored.daily_usage, 1);
    }

    #[tokio::test]
    async fn test_custom_file_name_is_normalized() {
        let f = fixture(FakeTtsClient::new(), 10, 5, Role::User).await;
        let mut cmd = command(&f.user, "hello");
        cmd.format = AudioFormat::Flac;
        cmd.custom_file_name = Some("../greeting.wav".to_string());

        let resp = f.handler.handle(cmd).await.unwrap();
        assert_eq!(resp.file_name, "greeting.flac");
        assert!(f.storage.exists("greeting.flac").await);
    }

    #[tokio::test]
    async fn test_custom_name_cannot_replace_shared_files() {
        let f = fixture(FakeTtsClient::new(), 10, 5, Role::User).await;
        let cached = f.handler.handle(command(&f.user, "你好")).await.unwrap();

        for name in [SILENCE_FILE_NAME.to_string(), cached.file_name.clone()] {
            let mut cmd = command(&f.user, "覆盖");
            cmd.custom_file_name = Some(name);
            let result = f.handler.handle(cmd).await;
            assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        }

        assert_eq!(f.engine.call_count(), 1);
        let stored = f.users.find_by_id(f.user.id.as_str()).await.unwrap().unwrap();
        assert_eq!(stored.daily_usage, 1);
    }

    #[tokio::test]
    async fn test_empty_text_returns_silence_without_backend() {
        let f = fixture(FakeTtsClient::new(), 10, 5, Role::User).await;
        let resp = f.handler.handle(command(&f.user, "")).await.unwrap();
        assert_eq!(resp.file_name, SILENCE_FILE_NAME);
        assert_eq!(f.engine.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let f = fixture(FakeTtsClient::new(), 2, 100, Role::User).await;
        f.handler.handle(command(&f.user, "a")).await.unwrap();
        f.handler.handle(command(&f.user, "b")).await.unwrap();
        let third = f.handler.handle(command(&f.user, "c")).await;
        assert!(matches!(third, Err(ApplicationError::TooManyRequests(m)) if m == RATE_LIMITED));
    }

    #[tokio::test]
    async fn test_daily_quota_for_users_not_admins() {
        let f = fixture(FakeTtsClient::new(), 100, 1, Role::User).await;
        f.handler.handle(command(&f.user, "a")).await.unwrap();
        let blocked = f.handler.handle(command(&f.user, "b")).await;
        assert!(matches!(blocked, Err(ApplicationError::Forbidden(_))));

        let admin = fixture(FakeTtsClient::new(), 100, 1, Role::Admin).await;
        admin.handler.handle(command(&admin.user, "a")).await.unwrap();
        admin.handler.handle(command(&admin.user, "b")).await.unwrap();
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_service_error() {
        let f = fixture(FakeTtsClient::failing(), 10, 5, Role::User).await;
        let result = f.handler.handle(command(&f.user, "hi")).await;
        assert!(matches!(result, Err(ApplicationError::ExternalServiceError(m)) if m == BACKEND_FAILED));

        let stored = f.users.find_by_id(f.user.id.as_str()).await.unwrap().unwrap();
        assert_eq!(stored.daily_usage, 0);
    }

    #[test]
    fn test_cache_name_depends_on_all_params() {
        let user = User::new(
            Username::new("x").unwrap(),
            Email::from_trusted("x@gmail.com"),
            String::new(),
            Role::User,
        );
        let a = command(&user, "same");
        let mut b = command(&user, "same");
        b.voice = SpeechVoice::Onyx;
        assert_ne!(cache_file_name(&a), cache_file_name(&b));
        assert_eq!(cache_file_name(&a), cache_file_name(&command(&user, "same")));
        assert_eq!(cache_file_name(&a).len(), 32 + 4);
    }
}
