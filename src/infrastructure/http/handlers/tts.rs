//! TTS HTTP Handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{GetAudioQuery, SynthesizeSpeech};
use crate::domain::speech::{AudioFormat, Speed, SpeechModel, SpeechVoice};
use crate::infrastructure::http::dto::{GenerateSpeechRequest, GenerateSpeechResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::Authenticated;
use crate::infrastructure::http::state::AppState;

/// 按 serde 名称解析枚举取值，缺省用默认值
fn parse_choice<T>(value: Option<String>, field: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    match value.filter(|v| !v.trim().is_empty()) {
        None => Ok(T::default()),
        Some(v) => serde_json::from_value(serde_json::Value::String(v.trim().to_string()))
            .map_err(|_| ApiError::BadRequest(format!("不支持的{}: {}", field, v))),
    }
}

fn speech_options(
    req: &mut GenerateSpeechRequest,
) -> Result<(SpeechModel, SpeechVoice, AudioFormat, Speed), ApiError> {
    let model = parse_choice(req.model.take(), "模型")?;
    let voice = parse_choice(req.voice.take(), "音色")?;
    let format = parse_choice(req.output_format.take(), "输出格式")?;
    let speed = match req.speed {
        Some(v) => Speed::new(v).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Speed::default(),
    };
    Ok((model, voice, format, speed))
}

/// 生成语音
pub async fn generate_speech(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
    payload: Result<Json<GenerateSpeechRequest>, JsonRejection>,
) -> Result<Json<GenerateSpeechResponse>, ApiError> {
    let Json(mut req) = payload?;
    let (model, voice, format, speed) = speech_options(&mut req)?;

    let result = state
        .synthesize_handler
        .handle(SynthesizeSpeech {
            user_id: ctx.user.id.to_string(),
            text: req.text,
            model,
            voice,
            format,
            speed,
            custom_file_name: req.custom_file_name,
        })
        .await?;

    Ok(Json(GenerateSpeechResponse {
        file_name: result.file_name,
        audio_url: result.audio_url,
        cached: result.cached,
    }))
}

/// 下载合成音频（流式）
pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let audio = state
        .get_audio_handler
        .handle(GetAudioQuery { file_name })
        .await?;

    let file = tokio::fs::File::open(&audio.path)
        .await
        .map_err(|e| ApiError::Internal("读取音频文件失败".to_string(), Some(e.to_string())))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal("读取音频文件失败".to_string(), Some(e.to_string())))?
        .len();

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, audio.content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", audio.file_name),
        )
        .body(body)
        .map_err(|e| ApiError::Internal("构建响应失败".to_string(), Some(e.to_string())))
}
