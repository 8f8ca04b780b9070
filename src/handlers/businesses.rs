use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminUser, locale::Locale},
    models::business::{Business, BusinessPayload},
};

#[utoipa::path(
    get,
    path = "/api/businesses",
    tag = "Businesses",
    responses((status = 200, body = [Business]))
)]
pub async fn list_businesses(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Business>>, ApiError> {
    let businesses = app_state
        .business_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(businesses))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}",
    tag = "Businesses",
    params(("id" = Uuid, Path, description = "Business id")),
    responses(
        (status = 200, body = Business),
        (status = 404, description = "Business not found")
    )
)]
pub async fn get_business(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Business>, ApiError> {
    let business = app_state
        .business_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(business))
}

#[utoipa::path(
    post,
    path = "/api/businesses",
    tag = "Businesses",
    request_body = BusinessPayload,
    security(("api_jwt" = [])),
    responses(
        (status = 201, body = Business),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_business(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(_admin): AdminUser,
    Json(payload): Json<BusinessPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let business = app_state
        .business_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(business)))
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}",
    tag = "Businesses",
    params(("id" = Uuid, Path, description = "Business id")),
    request_body = BusinessPayload,
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = Business),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn update_business(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BusinessPayload>,
) -> Result<Json<Business>, ApiError> {
    payload
        .validate()
        .map_err(AppError::ValidationError)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let business = app_state
        .business_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(business))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}",
    tag = "Businesses",
    params(("id" = Uuid, Path, description = "Business id")),
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = Business, description = "Listing marked inactive"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn delete_business(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Business>, ApiError> {
    let business = app_state
        .business_service
        .deactivate(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(business))
}
