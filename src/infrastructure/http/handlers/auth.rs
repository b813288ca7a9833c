//! Auth HTTP Handlers
//!
//! 注册、邮箱验证、登录、二次验证、当前用户、登出

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::application::{
    bearer_token, GetCurrentUser, Login, LoginOutcome, Logout, PasskeyVerify, Register,
    VerifyEmail, VerifyUser,
};
use crate::infrastructure::http::dto::{
    CurrentUserResponse, LoginRequest, LoginResponse, LoginUser, PasskeyUser,
    PasskeyVerifyRequest, PasskeyVerifyResponse, RegisterRequest, RegisterResponse,
    SuccessResponse, TokenResponse, VerifyEmailRequest, VerifyUserRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::{authorization, Authenticated, ClientIp};
use crate::infrastructure::http::state::AppState;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .register_handler
        .handle(Register {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(RegisterResponse {
        need_verify: result.need_verify,
    }))
}

/// 邮箱验证
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;
    state
        .verify_email_handler
        .handle(VerifyEmail {
            email: req.email,
            code: req.code,
        })
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state
        .login_handler
        .handle(Login {
            identifier: req.identifier,
            password: req.password,
            client_ip: ip,
        })
        .await?;

    let response = match outcome {
        LoginOutcome::Authenticated { user, token } => LoginResponse {
            user: LoginUser::from(&user),
            token,
            requires_2fa: None,
            two_factor_type: None,
        },
        LoginOutcome::SecondFactorRequired {
            user,
            pending_token,
            factors,
        } => LoginResponse {
            user: LoginUser::from(&user),
            token: pending_token,
            requires_2fa: Some(true),
            two_factor_type: Some(factors),
        },
    };

    Ok(Json(response))
}

/// 当前用户
pub async fn me(
    State(state): State<Arc<AppState>>,
    Authenticated(ctx): Authenticated,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let result = state
        .current_user_handler
        .handle(GetCurrentUser {
            user_id: ctx.user.id.to_string(),
        })
        .await?;

    Ok(Json(CurrentUserResponse {
        user: result.user,
        remaining_usage: result.remaining_usage,
    }))
}

/// Passkey 二次验证
pub async fn passkey_verify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PasskeyVerifyRequest>, JsonRejection>,
) -> Result<Json<PasskeyVerifyResponse>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .passkey_verify_handler
        .handle(PasskeyVerify {
            username: req.username,
            credential_id: req.passkey_credential_id,
        })
        .await?;

    Ok(Json(PasskeyVerifyResponse {
        success: true,
        token: result.token,
        user: PasskeyUser {
            id: result.user.id.to_string(),
            username: result.user.username.to_string(),
            email: result.user.email.to_string(),
        },
    }))
}

/// TOTP / Passkey 二次验证
pub async fn verify_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyUserRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;
    let result = state
        .verify_user_handler
        .handle(VerifyUser {
            user_id: req.user_id,
            verification_code: req.verification_code,
        })
        .await?;

    Ok(Json(TokenResponse {
        success: true,
        token: result.token,
    }))
}

/// 登出，总是成功
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let header = authorization(&headers);
    let bearer = bearer_token(header.as_deref()).map(str::to_string);
    state.logout_handler.handle(Logout { bearer }).await?;
    Ok(Json(SuccessResponse::ok()))
}
