use axum::{Json, extract::State};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AdminUser, locale::Locale},
    services::maintenance::MigrationReport,
};

// One-off cleanup for refresh tokens written before the expires_at rename.
// Safe to call repeatedly; an already-migrated table reports zeros.
#[utoipa::path(
    post,
    path = "/api/maintenance/migrate-refresh-tokens",
    tag = "Maintenance",
    security(("api_jwt" = [])),
    responses(
        (status = 200, body = MigrationReport),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn migrate_refresh_tokens(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(_admin): AdminUser,
) -> Result<Json<MigrationReport>, ApiError> {
    let report = app_state
        .maintenance_service
        .migrate_refresh_tokens()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(report))
}
