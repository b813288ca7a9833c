//! TOTP 与 Passkey 凭证管理

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::application::{
    DisableTotp, EnableTotp, ListPasskeys, RegisterPasskey, RemovePasskey, SetupTotp,
};
use crate::infrastructure::http::dto::{
    PasskeyListResponse, PasskeyRegisteredResponse, RegisterPasskeyRequest, RemovePasskeyRequest,
    SuccessResponse, TotpSetupResponse, TotpTokenRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::Authenticated;
use crate::infrastructure::http::state::AppState;

pub async fn totp_setup(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
) -> Result<Json<TotpSetupResponse>, ApiError> {
    let result = state
        .setup_totp_handler
        .handle(SetupTotp {
            user_id: ctx.user.id.to_string(),
        })
        .await?;

    Ok(Json(TotpSetupResponse {
        secret: result.secret,
        otpauth_url: result.otpauth_url,
    }))
}

pub async fn totp_enable(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
    payload: Result<Json<TotpTokenRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    state
        .enable_totp_handler
        .handle(EnableTotp {
            user_id: ctx.user.id.to_string(),
            token: req.token,
        })
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

pub async fn totp_disable(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
    payload: Result<Json<TotpTokenRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    state
        .disable_totp_handler
        .handle(DisableTotp {
            user_id: ctx.user.id.to_string(),
            token: req.token,
        })
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

pub async fn list_passkeys(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
) -> Result<Json<PasskeyListResponse>, ApiError> {
    let credentials = state
        .list_passkeys_handler
        .handle(ListPasskeys {
            user_id: ctx.user.id.to_string(),
        })
        .await?;

    Ok(Json(PasskeyListResponse { credentials }))
}

pub async fn register_passkey(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
    payload: Result<Json<RegisterPasskeyRequest>, JsonRejection>,
) -> Result<Json<PasskeyRegisteredResponse>, ApiError> {
    let Json(req) = payload?;
    let credential = state
        .register_passkey_handler
        .handle(RegisterPasskey {
            user_id: ctx.user.id.to_string(),
            credential_id: req.credential_id,
            name: req.name,
        })
        .await?;

    Ok(Json(PasskeyRegisteredResponse {
        success: true,
        credential,
    }))
}

pub async fn remove_passkey(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
    payload: Result<Json<RemovePasskeyRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    state
        .remove_passkey_handler
        .handle(RemovePasskey {
            user_id: ctx.user.id.to_string(),
            credential_id: req.credential_id,
        })
        .await?;

    Ok(Json(SuccessResponse::ok()))
}
