use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AdminUser, MaybeIdentity},
        locale::Locale,
    },
    models::{
        auth::Identity,
        user::{IsAdminResponse, SetAdminStatusPayload, User},
    },
};

#[utoipa::path(
    get,
    path = "/api/users/is-admin",
    tag = "Users",
    responses((status = 200, body = IsAdminResponse))
)]
pub async fn get_is_admin(
    State(app_state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Json<IsAdminResponse> {
    // Must never fail: anonymous callers and unknown emails are simply
    // not admins.
    let is_admin = app_state.authz_service.is_admin(identity.as_ref()).await;
    Json(IsAdminResponse { is_admin })
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, body = Identity, description = "The raw identity, or null when anonymous"))
)]
pub async fn get_current_user(MaybeIdentity(identity): MaybeIdentity) -> Json<Option<Identity>> {
    Json(identity)
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = [User]),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = app_state
        .user_repo
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

#[utoipa::path(
    put,
    path = "/api/users/admin-status",
    tag = "Users",
    request_body = SetAdminStatusPayload,
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = User),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_admin_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(admin): AdminUser,
    Json(payload): Json<SetAdminStatusPayload>,
) -> Result<Json<User>, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_repo
        .set_admin_status(&payload.email, payload.is_admin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?
        .ok_or_else(|| AppError::UserNotFound.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(
        "admin flag for {} set to {} by {}",
        payload.email,
        payload.is_admin,
        admin.id
    );
    Ok(Json(user))
}
