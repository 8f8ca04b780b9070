use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BusinessRepository,
    models::business::{
        Business, BusinessMetadata, BusinessMetadataPayload, BusinessPayload, BusinessStatus,
    },
};

#[derive(Clone)]
pub struct BusinessService {
    repo: BusinessRepository,
}

impl BusinessService {
    pub fn new(repo: BusinessRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Business>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Business, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::BusinessNotFound)
    }

    pub async fn create(&self, payload: &BusinessPayload) -> Result<Business, AppError> {
        let metadata = stamp_new_metadata(&payload.metadata, Utc::now());
        let business = self.repo.insert(payload, &metadata).await?;
        tracing::info!("business created: {}", business.id);
        Ok(business)
    }

    // Wholesale replacement. `date_added` survives from the stored row;
    // `last_updated` is re-stamped no matter what the caller sent.
    pub async fn update(&self, id: Uuid, payload: &BusinessPayload) -> Result<Business, AppError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::BusinessNotFound)?;

        let metadata = stamp_updated_metadata(
            &payload.metadata,
            existing.metadata.date_added,
            Utc::now(),
        );
        self.repo
            .update(id, payload, &metadata)
            .await?
            .ok_or(AppError::BusinessNotFound)
    }

    // Soft delete: the listing stays on record with status `inactive`.
    pub async fn deactivate(&self, id: Uuid) -> Result<Business, AppError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::BusinessNotFound)?;

        let metadata = deactivated_metadata(&existing.metadata, Utc::now());
        let business = self
            .repo
            .update_metadata(id, &metadata)
            .await?
            .ok_or(AppError::BusinessNotFound)?;
        tracing::info!("business deactivated: {}", business.id);
        Ok(business)
    }
}

fn stamp_new_metadata(payload: &BusinessMetadataPayload, now: DateTime<Utc>) -> BusinessMetadata {
    BusinessMetadata {
        date_added: now,
        last_updated: now,
        is_verified: payload.is_verified,
        status: payload.status,
        target: payload.target.clone(),
        limit: payload.limit.clone(),
        reviewer: payload.reviewer.clone(),
    }
}

fn stamp_updated_metadata(
    payload: &BusinessMetadataPayload,
    date_added: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BusinessMetadata {
    BusinessMetadata {
        date_added,
        last_updated: now,
        is_verified: payload.is_verified,
        status: payload.status,
        target: payload.target.clone(),
        limit: payload.limit.clone(),
        reviewer: payload.reviewer.clone(),
    }
}

fn deactivated_metadata(existing: &BusinessMetadata, now: DateTime<Utc>) -> BusinessMetadata {
    BusinessMetadata {
        status: BusinessStatus::Inactive,
        last_updated: now,
        ..existing.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload_metadata(status: BusinessStatus) -> BusinessMetadataPayload {
        BusinessMetadataPayload {
            is_verified: false,
            status,
            target: None,
            limit: None,
            reviewer: Some("lgu-reviewer".to_string()),
        }
    }

    #[test]
    fn creation_stamps_both_timestamps_identically() {
        let now = Utc::now();
        let metadata = stamp_new_metadata(&payload_metadata(BusinessStatus::Pending), now);

        assert_eq!(metadata.date_added, metadata.last_updated);
        assert_eq!(metadata.date_added, now);
        assert_eq!(metadata.status, BusinessStatus::Pending);
        assert!(!metadata.is_verified);
    }

    #[test]
    fn updates_preserve_date_added_and_restamp_last_updated() {
        let added = Utc::now() - Duration::days(30);
        let now = Utc::now();
        let metadata = stamp_updated_metadata(&payload_metadata(BusinessStatus::Active), added, now);

        assert_eq!(metadata.date_added, added);
        assert_eq!(metadata.last_updated, now);
        assert!(metadata.last_updated > metadata.date_added);
    }

    #[test]
    fn deactivation_flips_status_and_keeps_everything_else() {
        let added = Utc::now() - Duration::days(7);
        let existing = BusinessMetadata {
            date_added: added,
            last_updated: added,
            is_verified: true,
            status: BusinessStatus::Active,
            target: Some("barangay".to_string()),
            limit: None,
            reviewer: None,
        };

        let now = Utc::now();
        let deactivated = deactivated_metadata(&existing, now);

        assert_eq!(deactivated.status, BusinessStatus::Inactive);
        assert_eq!(deactivated.last_updated, now);
        assert_eq!(deactivated.date_added, added);
        assert!(deactivated.is_verified);
        assert_eq!(deactivated.target.as_deref(), Some("barangay"));
    }
}
