use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    config::AppState,
    i18n::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES, path_language},
};

// Browser session cookie checked by the page guard; API calls use the
// bearer header instead.
const SESSION_COOKIE: &str = "session";

// Page prefixes that require a signed-in session, checked after the locale
// prefix is stripped.
const PROTECTED_PREFIXES: &[&str] = &["/admin", "/dashboard"];

// UI language for the request: path prefix first, then the
// Accept-Language header, then the default.
pub struct Locale(pub String);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(lang) = path_language(parts.uri.path()) {
            return Ok(Locale(lang.to_string()));
        }

        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                accept_language::parse(value).into_iter().find_map(|tag| {
                    let primary = tag.split('-').next().unwrap_or(&tag).to_string();
                    SUPPORTED_LANGUAGES
                        .iter()
                        .find(|lang| **lang == primary)
                        .map(|lang| lang.to_string())
                })
            })
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Locale(lang))
    }
}

pub(crate) fn strip_language_prefix(path: &str) -> &str {
    if let Some(lang) = path_language(path) {
        let rest = &path[lang.len() + 1..];
        if rest.is_empty() { "/" } else { rest }
    } else {
        path
    }
}

pub(crate) fn is_protected_path(path: &str) -> bool {
    let stripped = strip_language_prefix(path);
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| stripped == *prefix || stripped.starts_with(&format!("{prefix}/")))
}

// API endpoints, docs and static assets keep their paths as-is.
fn is_locale_exempt(path: &str) -> bool {
    path.starts_with("/api") || path.starts_with("/docs") || path.contains('.')
}

// Where a page request without a language prefix should go, if anywhere.
pub(crate) fn locale_redirect_target(path: &str) -> Option<String> {
    if is_locale_exempt(path) || path_language(path).is_some() {
        return None;
    }
    if path == "/" || path.is_empty() {
        return Some(format!("/{DEFAULT_LANGUAGE}"));
    }
    Some(format!("/{DEFAULT_LANGUAGE}{path}"))
}

pub(crate) fn login_redirect_target(path: &str) -> String {
    let locale = path_language(path).unwrap_or(DEFAULT_LANGUAGE);
    format!("/{locale}/login")
}

// Prepends the default language to bare page paths, mirroring how the
// locale-prefixed route tree is addressed.
pub async fn locale_redirect(request: Request<Body>, next: Next) -> Response {
    let target = locale_redirect_target(request.uri().path());
    match target {
        Some(target) => Redirect::temporary(&target).into_response(),
        None => next.run(request).await,
    }
}

// Redirects unauthenticated requests away from admin pages before any
// handler or data access runs. Admin-ness itself is checked later, against
// the database, by the AdminUser extractor.
pub async fn admin_route_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_protected_path(&path) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()));

    let authenticated = token
        .as_deref()
        .is_some_and(|token| app_state.auth_service.validate_token(token).is_ok());

    if authenticated {
        next.run(request).await
    } else {
        Redirect::temporary(&login_redirect_target(&path)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_pages_are_protected_with_and_without_locale_prefix() {
        assert!(is_protected_path("/admin/dashboard"));
        assert!(is_protected_path("/admin"));
        assert!(is_protected_path("/dashboard"));
        assert!(is_protected_path("/en/admin/businesses"));
        assert!(is_protected_path("/fil/dashboard"));
    }

    #[test]
    fn public_pages_are_not_protected() {
        assert!(!is_protected_path("/business"));
        assert!(!is_protected_path("/en/business/123"));
        assert!(!is_protected_path("/administrator"));
        assert!(!is_protected_path("/"));
    }

    #[test]
    fn unauthenticated_admin_requests_redirect_to_locale_prefixed_login() {
        assert_eq!(login_redirect_target("/admin/dashboard"), "/en/login");
        assert_eq!(login_redirect_target("/fil/admin/dashboard"), "/fil/login");
    }

    #[test]
    fn bare_paths_gain_the_default_language_prefix() {
        assert_eq!(
            locale_redirect_target("/business").as_deref(),
            Some("/en/business")
        );
        assert_eq!(locale_redirect_target("/").as_deref(), Some("/en"));
    }

    #[test]
    fn prefixed_api_and_asset_paths_pass_through() {
        assert_eq!(locale_redirect_target("/en/business"), None);
        assert_eq!(locale_redirect_target("/fil"), None);
        assert_eq!(locale_redirect_target("/api/businesses"), None);
        assert_eq!(locale_redirect_target("/docs"), None);
        assert_eq!(locale_redirect_target("/favicon.ico"), None);
    }

    #[test]
    fn stripping_the_language_prefix_keeps_the_rest_of_the_path() {
        assert_eq!(strip_language_prefix("/en/admin/users"), "/admin/users");
        assert_eq!(strip_language_prefix("/fil"), "/");
        assert_eq!(strip_language_prefix("/admin"), "/admin");
    }
}
