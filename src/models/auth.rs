use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Claims carried inside the JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub exp: usize, // expiration time
    pub iat: usize, // issued at
}

// The raw identity derived from a validated token. This is what
// `GET /api/users/me` returns and what the authorization helpers consume;
// the full user row is always re-queried by email.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterPayload {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(custom(function = validate_password_strength))]
    pub password: String,
}

// Login is lenient on purpose; the stored hash decides.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// 8+ characters with at least one digit, one lowercase and one uppercase
// letter.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());

    if long_enough && has_digit && has_lower && has_upper {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(
            "Password must be at least 8 characters and contain a number, \
             a lowercase and an uppercase letter."
                .into(),
        ))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MagicLinkPayload {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCodePayload {
    #[validate(length(min = 1, message = "A sign-in code is required."))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    #[validate(length(min = 1, message = "A refresh token is required."))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
}

// A magic-link verification code row. Single-use, valid for 20 minutes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationCode {
    pub id: Uuid,
    pub account_id: Uuid,
    pub code: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

// A refresh token row. `user_id`, `expires_at` and the legacy
// `expiration_time` (epoch milliseconds) are nullable so rows written
// before the field rename can still be loaded and migrated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub session_id: Uuid,
    pub parent_refresh_token_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expiration_time: Option<f64>,
    pub first_used_time: Option<DateTime<Utc>>,
    pub consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_passwords_are_accepted() {
        let payload = RegisterPayload {
            email: "maria@example.ph".to_string(),
            password: "Mabuhay2024".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        for password in ["short1A", "alllowercase1", "ALLUPPERCASE1", "NoDigitsHere"] {
            let payload = RegisterPayload {
                email: "maria@example.ph".to_string(),
                password: password.to_string(),
            };
            assert!(payload.validate().is_err(), "{password} should be rejected");
        }
    }

    #[test]
    fn login_only_requires_a_non_empty_password() {
        let payload = LoginPayload {
            email: "maria@example.ph".to_string(),
            password: "x".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
