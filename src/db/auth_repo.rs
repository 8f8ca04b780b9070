use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{RefreshToken, VerificationCode},
};

const CODE_COLUMNS: &str = "id, account_id, code, email, expires_at, consumed";
const TOKEN_COLUMNS: &str = "id, session_id, parent_refresh_token_id, user_id, \
     expires_at, expiration_time, first_used_time, consumed";

// Credential and session records: auth accounts, magic-link verification
// codes and refresh tokens.
#[derive(Clone)]
pub struct AuthRepository {
    pool: PgPool,
}

impl AuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // One row per (provider, provider account). Returns the account id,
    // creating the row on first sign-in with that provider.
    pub async fn upsert_account(
        &self,
        provider: &str,
        provider_account_id: &str,
        user_id: Uuid,
    ) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO auth_accounts (provider, provider_account_id, user_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (provider, provider_account_id) \
             DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id",
        )
        .bind(provider)
        .bind(provider_account_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn create_verification_code(
        &self,
        account_id: Uuid,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<VerificationCode, AppError> {
        let row = sqlx::query_as::<_, VerificationCode>(&format!(
            "INSERT INTO auth_verification_codes (account_id, email, code, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING {CODE_COLUMNS}"
        ))
        .bind(account_id)
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // Atomically marks a live code as consumed. Expired, unknown and
    // already-used codes all come back as None.
    pub async fn consume_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<VerificationCode>, AppError> {
        let row = sqlx::query_as::<_, VerificationCode>(&format!(
            "UPDATE auth_verification_codes SET consumed = TRUE \
             WHERE code = $1 AND NOT consumed AND expires_at > NOW() \
             RETURNING {CODE_COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create_refresh_token(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        parent_refresh_token_id: Option<Uuid>,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, AppError> {
        let row = sqlx::query_as::<_, RefreshToken>(&format!(
            "INSERT INTO auth_refresh_tokens \
             (user_id, session_id, parent_refresh_token_id, expires_at) \
             VALUES ($1, $2, $3, $4) RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(user_id)
        .bind(session_id)
        .bind(parent_refresh_token_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // Single-use rotation: marks the token consumed and records first use.
    // Consumed, expired and ownerless tokens all come back as None.
    pub async fn consume_refresh_token(&self, id: Uuid) -> Result<Option<RefreshToken>, AppError> {
        let row = sqlx::query_as::<_, RefreshToken>(&format!(
            "UPDATE auth_refresh_tokens \
             SET consumed = TRUE, first_used_time = COALESCE(first_used_time, NOW()) \
             WHERE id = $1 AND NOT consumed AND user_id IS NOT NULL \
               AND (expires_at IS NULL OR expires_at > NOW()) \
             RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_refresh_tokens(&self) -> Result<Vec<RefreshToken>, AppError> {
        let rows = sqlx::query_as::<_, RefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM auth_refresh_tokens"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_refresh_token(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM auth_refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_refresh_token_expires_at(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE auth_refresh_tokens SET expires_at = $2 \
             WHERE id = $1 AND expires_at IS NULL",
        )
        .bind(id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
