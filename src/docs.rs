use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::request_magic_link,
        handlers::auth::verify_magic_link,
        handlers::auth::refresh_session,

        // --- Businesses ---
        handlers::businesses::list_businesses,
        handlers::businesses::get_business,
        handlers::businesses::create_business,
        handlers::businesses::update_business,
        handlers::businesses::delete_business,

        // --- Users ---
        handlers::users::get_is_admin,
        handlers::users::get_current_user,
        handlers::users::list_users,
        handlers::users::set_admin_status,

        // --- Maintenance ---
        handlers::maintenance::migrate_refresh_tokens,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identity,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::MagicLinkPayload,
            models::auth::VerifyCodePayload,
            models::auth::RefreshPayload,
            models::auth::AuthResponse,

            // --- Users ---
            models::user::User,
            models::user::UserRole,
            models::user::IsAdminResponse,
            models::user::SetAdminStatusPayload,

            // --- Businesses ---
            models::business::Business,
            models::business::BusinessPayload,
            models::business::BilingualText,
            models::business::Category,
            models::business::Contact,
            models::business::Coordinates,
            models::business::Address,
            models::business::DayHours,
            models::business::OperatingHours,
            models::business::Photo,
            models::business::BusinessStatus,
            models::business::BusinessMetadata,
            models::business::BusinessMetadataPayload,

            // --- Maintenance ---
            services::maintenance::MigrationReport,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and magic-link sign-in"),
        (name = "Businesses", description = "Directory listings"),
        (name = "Users", description = "Profiles and admin roles"),
        (name = "Maintenance", description = "One-off data migrations")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
