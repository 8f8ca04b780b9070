use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{AuthRepository, BusinessRepository, UserRepository},
    i18n::I18nStore,
    services::{
        auth::AuthService, authz::AuthzService, business::BusinessService, mailer::Mailer,
        maintenance::MaintenanceService,
    },
};

// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub user_repo: UserRepository,
    pub auth_service: AuthService,
    pub authz_service: AuthzService,
    pub business_service: BusinessService,
    pub maintenance_service: MaintenanceService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let resend_api_key = env::var("RESEND_API_KEY").expect("RESEND_API_KEY must be set");
        let email_from = env::var("EMAIL_FROM")
            .unwrap_or_else(|_| "Gloria Connect <onboarding@resend.dev>".to_string());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;
        tracing::info!("database connection established");

        // Dependency graph: repositories, then the services built on them.
        let user_repo = UserRepository::new(db_pool.clone());
        let business_repo = BusinessRepository::new(db_pool.clone());
        let auth_repo = AuthRepository::new(db_pool.clone());

        let mailer = Mailer::new(resend_api_key, email_from);
        let auth_service = AuthService::new(
            user_repo.clone(),
            auth_repo.clone(),
            mailer,
            jwt_secret,
            public_base_url,
        );
        let authz_service = AuthzService::new(user_repo.clone());
        let business_service = BusinessService::new(business_repo);
        let maintenance_service = MaintenanceService::new(auth_repo);

        Ok(Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            user_repo,
            auth_service,
            authz_service,
            business_service,
            maintenance_service,
        })
    }
}
