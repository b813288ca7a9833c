//! LogShare HTTP Handlers
//!
//! 上传、列表、查询；列表与查询的响应体已加密

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::application::security::EncryptedPayload;
use crate::application::{ListShareLogs, QueryShareLog, UploadShareLog, UploadedFile};
use crate::infrastructure::http::dto::{QueryShareLogRequest, UploadShareLogResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::{authorization, ClientIp};
use crate::infrastructure::http::state::AppState;

/// 上传日志文件（multipart: file, adminPassword）
pub async fn upload_share_log(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    mut multipart: Multipart,
) -> Result<Json<UploadShareLogResponse>, ApiError> {
    let mut file: Option<UploadedFile> = None;
    let mut admin_password: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?.to_vec();
                file = Some(UploadedFile { file_name, data });
            }
            "adminPassword" => {
                admin_password = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let result = state
        .upload_share_log_handler
        .handle(UploadShareLog {
            file,
            admin_password,
            client_ip: ip,
        })
        .await?;

    Ok(Json(UploadShareLogResponse {
        id: result.id,
        link: result.link,
        ext: result.ext,
    }))
}

/// 列出全部日志（管理员 JWT）
pub async fn list_share_logs(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Json<EncryptedPayload>, ApiError> {
    let payload = state
        .list_share_logs_handler
        .handle(ListShareLogs {
            authorization: authorization(&headers),
            client_ip: ip,
        })
        .await?;

    Ok(Json(payload))
}

/// 按 ID 查询日志内容
pub async fn query_share_log(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
    payload: Result<Json<QueryShareLogRequest>, JsonRejection>,
) -> Result<Json<EncryptedPayload>, ApiError> {
    // 请求体缺失或无法解析时按缺少密码处理
    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let payload = state
        .query_share_log_handler
        .handle(QueryShareLog {
            id,
            admin_password: req.admin_password,
            client_ip: ip,
        })
        .await?;

    Ok(Json(payload))
}
