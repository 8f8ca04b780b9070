use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod i18n;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // If configuration fails the application must not start.
    let app_state = AppState::new()
        .await
        .expect("failed to initialize application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");
    tracing::info!("database migrations applied");

    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/magic-link", post(handlers::auth::request_magic_link))
        .route("/verify", post(handlers::auth::verify_magic_link))
        .route("/refresh", post(handlers::auth::refresh_session));

    // Reads are public; writes check the admin flag in the handler
    // extractor, re-queried per request.
    let business_routes = Router::new()
        .route(
            "/",
            get(handlers::businesses::list_businesses).post(handlers::businesses::create_business),
        )
        .route(
            "/{id}",
            get(handlers::businesses::get_business)
                .put(handlers::businesses::update_business)
                .delete(handlers::businesses::delete_business),
        );

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/me", get(handlers::users::get_current_user))
        .route("/is-admin", get(handlers::users::get_is_admin))
        .route("/admin-status", put(handlers::users::set_admin_status));

    let maintenance_routes = Router::new().route(
        "/migrate-refresh-tokens",
        post(handlers::maintenance::migrate_refresh_tokens),
    );

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/businesses", business_routes)
        .nest("/api/users", user_routes)
        .nest("/api/maintenance", maintenance_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Page middleware: the admin guard runs after the locale redirect
        // has normalized the path.
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            middleware::locale::admin_route_guard,
        ))
        .layer(axum_middleware::from_fn(middleware::locale::locale_redirect))
        .with_state(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.expect("server error");
}
