//! Audio Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{AudioStorageError, AudioStoragePort};
use crate::application::queries::audio_queries::{GetAudioQuery, GetAudioResponse};
use crate::domain::speech::content_type_for;

/// GetAudio Handler - 定位已合成的音频文件
pub struct GetAudioHandler {
    audio_storage: Arc<dyn AudioStoragePort>,
}

impl GetAudioHandler {
    pub fn new(audio_storage: Arc<dyn AudioStoragePort>) -> Self {
        Self { audio_storage }
    }

    pub async fn handle(&self, query: GetAudioQuery) -> Result<GetAudioResponse, ApplicationError> {
        let path = self.audio_storage.audio_path(&query.file_name)?;
        if !self.audio_storage.exists(&query.file_name).await {
            return Err(AudioStorageError::FileNotFound(query.file_name).into());
        }

        Ok(GetAudioResponse {
            path,
            content_type: content_type_for(&query.file_name),
            file_name: query.file_name,
        })
    }
}
