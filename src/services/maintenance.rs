use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, db::AuthRepository, models::auth::RefreshToken};

// One-off cleanup of refresh tokens written before the `expiration_time`
// -> `expires_at` rename: ownerless rows are unrecoverable and deleted,
// legacy timestamps are copied into the new field.
#[derive(Clone)]
pub struct MaintenanceService {
    auth_repo: AuthRepository,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MigrationReport {
    pub updated: u64,
    pub removed: u64,
}

impl MaintenanceService {
    pub fn new(auth_repo: AuthRepository) -> Self {
        Self { auth_repo }
    }

    pub async fn migrate_refresh_tokens(&self) -> Result<MigrationReport, AppError> {
        let tokens = self.auth_repo.list_refresh_tokens().await?;
        let plan = plan_refresh_token_migration(&tokens);

        let mut removed = 0;
        for id in plan.remove {
            removed += self.auth_repo.delete_refresh_token(id).await?;
        }

        let mut updated = 0;
        for (id, expires_at) in plan.set_expires_at {
            updated += self
                .auth_repo
                .set_refresh_token_expires_at(id, expires_at)
                .await?;
        }

        tracing::info!(
            "refresh token migration finished: {} updated, {} removed",
            updated,
            removed
        );
        Ok(MigrationReport { updated, removed })
    }
}

struct MigrationPlan {
    remove: Vec<Uuid>,
    set_expires_at: Vec<(Uuid, DateTime<Utc>)>,
}

fn plan_refresh_token_migration(tokens: &[RefreshToken]) -> MigrationPlan {
    let mut plan = MigrationPlan {
        remove: Vec::new(),
        set_expires_at: Vec::new(),
    };

    for token in tokens {
        // Ownerless tokens cannot be recovered; they are deleted even when
        // they also carry a legacy timestamp.
        if token.user_id.is_none() {
            plan.remove.push(token.id);
            continue;
        }

        if token.expires_at.is_none() {
            if let Some(millis) = token.expiration_time {
                if let Some(expires_at) = DateTime::from_timestamp_millis(millis as i64) {
                    plan.set_expires_at.push((token.id, expires_at));
                }
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(
        user_id: Option<Uuid>,
        expires_at: Option<DateTime<Utc>>,
        expiration_time: Option<f64>,
    ) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            parent_refresh_token_id: None,
            user_id,
            expires_at,
            expiration_time,
            first_used_time: None,
            consumed: false,
        }
    }

    #[test]
    fn ownerless_tokens_are_removed_not_updated() {
        let legacy_ms = 1_700_000_000_000.0;
        let tokens = vec![token(None, None, Some(legacy_ms))];

        let plan = plan_refresh_token_migration(&tokens);

        assert_eq!(plan.remove.len(), 1);
        assert!(plan.set_expires_at.is_empty());
    }

    #[test]
    fn legacy_timestamps_are_copied_into_expires_at() {
        let legacy_ms = 1_700_000_000_000.0;
        let owned = token(Some(Uuid::new_v4()), None, Some(legacy_ms));
        let id = owned.id;

        let plan = plan_refresh_token_migration(&[owned]);

        assert!(plan.remove.is_empty());
        assert_eq!(plan.set_expires_at.len(), 1);
        let (planned_id, expires_at) = plan.set_expires_at[0];
        assert_eq!(planned_id, id);
        assert_eq!(expires_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn rows_with_both_fields_are_left_alone() {
        let tokens = vec![token(
            Some(Uuid::new_v4()),
            Some(Utc::now()),
            Some(1_700_000_000_000.0),
        )];

        let plan = plan_refresh_token_migration(&tokens);

        assert!(plan.remove.is_empty());
        assert!(plan.set_expires_at.is_empty());
    }

    #[test]
    fn already_migrated_rows_are_untouched() {
        let tokens = vec![token(Some(Uuid::new_v4()), Some(Utc::now()), None)];
        let plan = plan_refresh_token_migration(&tokens);
        assert!(plan.remove.is_empty());
        assert!(plan.set_expires_at.is_empty());
    }

    #[test]
    fn a_mixed_batch_counts_exactly() {
        let legacy_ms = 1_650_000_000_000.0;
        let tokens = vec![
            token(None, None, None),
            token(None, None, Some(legacy_ms)),
            token(Some(Uuid::new_v4()), None, Some(legacy_ms)),
            token(Some(Uuid::new_v4()), Some(Utc::now()), None),
        ];

        let plan = plan_refresh_token_migration(&tokens);

        assert_eq!(plan.remove.len(), 2);
        assert_eq!(plan.set_expires_at.len(), 1);
    }
}
