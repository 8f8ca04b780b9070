use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::locale::Locale,
    models::auth::{
        AuthResponse, LoginPayload, MagicLinkPayload, RefreshPayload, RegisterPayload,
        VerifyCodePayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, body = AuthResponse),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let session = app_state
        .auth_service
        .register(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let session = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/auth/magic-link",
    tag = "Auth",
    request_body = MagicLinkPayload,
    responses((status = 202, description = "Sign-in email queued"))
)]
pub async fn request_magic_link(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<MagicLinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .request_magic_link(&payload.email, &locale.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .i18n_store
        .translate(&locale.0, "auth.magic_link_sent");
    Ok((StatusCode::ACCEPTED, Json(json!({ "message": message }))))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "Auth",
    request_body = VerifyCodePayload,
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Invalid, expired or already-used code")
    )
)]
pub async fn verify_magic_link(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<VerifyCodePayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let session = app_state
        .auth_service
        .verify_magic_link(&payload.code)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    request_body = RefreshPayload,
    responses(
        (status = 200, body = AuthResponse),
        (status = 401, description = "Unknown, consumed or expired refresh token")
    )
)]
pub async fn refresh_session(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let session = app_state
        .auth_service
        .refresh(&payload.refresh_token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(session))
}
