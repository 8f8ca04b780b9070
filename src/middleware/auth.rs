use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::Identity, user::User},
};

pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

// Extractor for routes that require a signed-in caller.
pub struct AuthenticatedIdentity(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or(AppError::AuthenticationRequired)?;
        let identity = app_state.auth_service.validate_token(token)?;
        Ok(AuthenticatedIdentity(identity))
    }
}

// Infallible variant for routes that behave differently when signed in but
// must never reject (`is-admin`, `me`).
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let identity = bearer_token(parts)
            .and_then(|token| app_state.auth_service.validate_token(token).ok());
        Ok(MaybeIdentity(identity))
    }
}

// The guard in front of every admin mutation. Admin status is re-derived
// from the users table on each request; there is no caching.
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let identity = bearer_token(parts)
            .and_then(|token| app_state.auth_service.validate_token(token).ok());

        let user = app_state
            .authz_service
            .require_admin(identity.as_ref())
            .await?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/businesses");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn extracts_the_bearer_token() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn ignores_non_bearer_schemes_and_missing_headers() {
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
    }
}
