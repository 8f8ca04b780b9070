use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::i18n::I18nStore;
use crate::middleware::locale::Locale;

// Application error taxonomy. Everything a handler can fail with maps onto
// one of these variants; `#[from]` keeps the `?` operator working across
// repos and services.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Email required for authorization")]
    EmailRequired,

    #[error("Admin access required")]
    AdminAccessRequired,

    #[error("{0} access required")]
    RoleRequired(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Business not found")]
    BusinessNotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid or expired sign-in code")]
    InvalidSignInCode,

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired
            | AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::InvalidSignInCode => StatusCode::UNAUTHORIZED,
            AppError::EmailRequired
            | AppError::AdminAccessRequired
            | AppError::RoleRequired(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::BusinessNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::EmailDelivery(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Message catalog id used to localize the error for the caller.
    pub fn message_id(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "error.validation",
            AppError::AuthenticationRequired => "error.auth_required",
            AppError::EmailRequired => "error.email_required",
            AppError::AdminAccessRequired => "error.admin_required",
            AppError::RoleRequired(_) => "error.role_required",
            AppError::UserNotFound => "error.user_not_found",
            AppError::BusinessNotFound => "error.business_not_found",
            AppError::EmailAlreadyExists => "error.email_taken",
            AppError::InvalidCredentials => "error.invalid_credentials",
            AppError::InvalidToken => "error.invalid_token",
            AppError::InvalidSignInCode => "error.invalid_code",
            AppError::EmailDelivery(_) => "error.email_delivery",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "error.internal",
        }
    }

    // Renders the error in the caller's language. Unexpected variants are
    // logged here with their full detail and surface only the generic
    // message.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        match self {
            AppError::ValidationError(errors) => ApiError {
                status: self.status(),
                error: store.translate(&locale.0, self.message_id()).to_string(),
                details: Some(validation_details(errors)),
            },
            AppError::RoleRequired(role) => ApiError {
                status: self.status(),
                error: store
                    .translate(&locale.0, self.message_id())
                    .replace("{role}", role),
                details: None,
            },
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::EmailDelivery(_) => {
                tracing::error!("internal error: {:?}", self);
                ApiError {
                    status: self.status(),
                    error: store.translate(&locale.0, self.message_id()).to_string(),
                    details: None,
                }
            }
            _ => ApiError {
                status: self.status(),
                error: store.translate(&locale.0, self.message_id()).to_string(),
                details: None,
            },
        }
    }
}

fn validation_details(errors: &validator::ValidationErrors) -> serde_json::Value {
    let mut details = std::collections::HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        details.insert(field.to_string(), messages);
    }
    json!(details)
}

// Default (English) rendering, used by extractor rejections that run before
// a Locale is available.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::ValidationError(ref errors) = self {
            let body = Json(json!({
                "error": "One or more fields are invalid.",
                "details": validation_details(errors),
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR || status == StatusCode::BAD_GATEWAY {
            tracing::error!("internal error: {}", self);
            let body = Json(json!({ "error": "An unexpected error occurred." }));
            return (status, body).into_response();
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

// Localized error payload handed back to the UI.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({ "error": self.error, "details": details })),
            None => Json(json!({ "error": self.error })),
        };
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::I18nStore;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            AppError::AuthenticationRequired.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::AdminAccessRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BusinessNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidSignInCode.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn api_error_is_localized() {
        let store = I18nStore::new();
        let err = AppError::AdminAccessRequired;

        let en = err.to_api_error(&Locale("en".to_string()), &store);
        assert_eq!(en.status, StatusCode::FORBIDDEN);
        assert_eq!(en.error, "Admin access required");

        let fil = err.to_api_error(&Locale("fil".to_string()), &store);
        assert_eq!(fil.error, "Kailangan ng admin access");
    }

    #[test]
    fn role_errors_interpolate_the_role_name() {
        let store = I18nStore::new();
        let err = AppError::RoleRequired("admin".to_string());
        let rendered = err.to_api_error(&Locale("en".to_string()), &store);
        assert_eq!(rendered.error, "admin access required");
    }
}
