use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuthRepository, UserRepository},
    models::{
        auth::{AuthResponse, Claims, Identity},
        user::User,
    },
    services::mailer::Mailer,
};

const ACCESS_TOKEN_DAYS: i64 = 7;
const REFRESH_TOKEN_DAYS: i64 = 30;
// Stated validity of the emailed sign-in link.
const MAGIC_LINK_MINUTES: i64 = 20;

const PASSWORD_PROVIDER: &str = "password";
const EMAIL_PROVIDER: &str = "email";

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    auth_repo: AuthRepository,
    mailer: Mailer,
    jwt_secret: String,
    public_base_url: String,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        auth_repo: AuthRepository,
        mailer: Mailer,
        jwt_secret: String,
        public_base_url: String,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            mailer,
            jwt_secret,
            public_base_url,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        // Hashing is CPU-bound, keep it off the async workers.
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("hashing task failed: {e}"))??;

        let user = self
            .user_repo
            .create(email, Some(&hashed_password), None)
            .await?;
        self.auth_repo
            .upsert_account(PASSWORD_PROVIDER, email, user.id)
            .await?;

        self.issue_session(&user).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let Some(password_hash) = user.password_hash.clone() else {
            // Magic-link-only account; no password to check against.
            return Err(AppError::InvalidCredentials);
        };

        let password_clone = password.to_owned();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.issue_session(&user).await
    }

    // Emails a single-use sign-in link. The user row is created on first
    // sign-in, so the response never reveals whether the address was
    // already registered.
    pub async fn request_magic_link(&self, email: &str, locale: &str) -> Result<(), AppError> {
        let user = match self.user_repo.find_by_email(email).await? {
            Some(user) => user,
            None => self.user_repo.create(email, None, None).await?,
        };
        let account_id = self
            .auth_repo
            .upsert_account(EMAIL_PROVIDER, email, user.id)
            .await?;

        let code = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::minutes(MAGIC_LINK_MINUTES);
        self.auth_repo
            .create_verification_code(account_id, email, &code, expires_at)
            .await?;

        let url = format!("{}/{}/login?code={}", self.public_base_url, locale, code);
        self.mailer.send_magic_link(email, &url).await
    }

    pub async fn verify_magic_link(&self, code: &str) -> Result<AuthResponse, AppError> {
        let code_row = self
            .auth_repo
            .consume_verification_code(code)
            .await?
            .ok_or(AppError::InvalidSignInCode)?;

        let user = self
            .user_repo
            .find_by_email(&code_row.email)
            .await?
            .ok_or(AppError::UserNotFound)?;
        self.user_repo.stamp_email_verification(user.id).await?;

        self.issue_session(&user).await
    }

    // Rotates a refresh token: the presented token is consumed and a child
    // token in the same session takes its place.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AppError> {
        let id = Uuid::parse_str(refresh_token).map_err(|_| AppError::InvalidToken)?;
        let parent = self
            .auth_repo
            .consume_refresh_token(id)
            .await?
            .ok_or(AppError::InvalidToken)?;
        let user_id = parent.user_id.ok_or(AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let token = self.create_token(&user)?;
        let child = self
            .auth_repo
            .create_refresh_token(
                user_id,
                parent.session_id,
                Some(parent.id),
                Utc::now() + Duration::days(REFRESH_TOKEN_DAYS),
            )
            .await?;

        Ok(AuthResponse {
            token,
            refresh_token: child.id.to_string(),
        })
    }

    // Stateless: the identity is read straight from the claims. Role checks
    // always re-query the users table afterwards.
    pub fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(Identity {
            id: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }

    async fn issue_session(&self, user: &User) -> Result<AuthResponse, AppError> {
        let token = self.create_token(user)?;
        let session_id = Uuid::new_v4();
        let refresh = self
            .auth_repo
            .create_refresh_token(
                user.id,
                session_id,
                None,
                Utc::now() + Duration::days(REFRESH_TOKEN_DAYS),
            )
            .await?;

        Ok(AuthResponse {
            token,
            refresh_token: refresh.id.to_string(),
        })
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::days(ACCESS_TOKEN_DAYS);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // A lazily-connecting pool never touches the network for token tests.
    fn test_service() -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/gloria_connect_test")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            AuthRepository::new(pool),
            Mailer::new("test-key".to_string(), "Gloria Connect <test@example.com>".to_string()),
            "test-secret".to_string(),
            "http://localhost:3000".to_string(),
        )
    }

    fn test_user(email: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: None,
            email: email.map(str::to_string),
            password_hash: None,
            phone: None,
            email_verification_time: None,
            is_anonymous: None,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn token_round_trip_preserves_the_identity() {
        let service = test_service();
        let user = test_user(Some("admin@gloria.ph"));

        let token = service.create_token(&user).unwrap();
        let identity = service.validate_token(&token).unwrap();

        assert_eq!(identity.id, user.id);
        assert_eq!(identity.email.as_deref(), Some("admin@gloria.ph"));
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let service = test_service();
        assert!(matches!(
            service.validate_token("not-a-jwt"),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn tokens_signed_with_another_secret_are_rejected() {
        let service = test_service();
        let user = test_user(Some("admin@gloria.ph"));
        let token = service.create_token(&user).unwrap();

        let other = AuthService {
            jwt_secret: "different-secret".to_string(),
            ..test_service()
        };
        assert!(matches!(
            other.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        let service = test_service();
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: None,
            exp: (now - Duration::hours(2)).timestamp() as usize,
            iat: (now - Duration::hours(3)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret".as_ref()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }
}
