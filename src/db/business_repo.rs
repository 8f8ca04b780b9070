use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::business::{
        Address, BilingualText, Business, BusinessMetadata, BusinessPayload, Category, Contact,
        OperatingHours, Photo,
    },
};

const BUSINESS_COLUMNS: &str = "id, business_id, name, category, contact, address, \
     description, operating_hours, photos, metadata";

// Nested shapes live in JSONB columns; `Json<T>` round-trips them through
// the typed model.
#[derive(sqlx::FromRow)]
struct BusinessRow {
    id: Uuid,
    business_id: Option<String>,
    name: Json<BilingualText>,
    category: Json<Category>,
    contact: Json<Contact>,
    address: Json<Address>,
    description: Json<BilingualText>,
    operating_hours: Json<OperatingHours>,
    photos: Option<Json<Vec<Photo>>>,
    metadata: Json<BusinessMetadata>,
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        Business {
            id: row.id,
            business_id: row.business_id,
            name: row.name.0,
            category: row.category.0,
            contact: row.contact.0,
            address: row.address.0,
            description: row.description.0,
            operating_hours: row.operating_hours.0,
            photos: row.photos.map(|p| p.0),
            metadata: row.metadata.0,
        }
    }
}

#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Full unfiltered collection. The directory is small by assumption;
    // there is no pagination.
    pub async fn list(&self) -> Result<Vec<Business>, AppError> {
        let rows = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Business::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Business>, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Business::from))
    }

    pub async fn insert(
        &self,
        payload: &BusinessPayload,
        metadata: &BusinessMetadata,
    ) -> Result<Business, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "INSERT INTO businesses \
             (business_id, name, category, contact, address, description, \
              operating_hours, photos, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(payload.business_id.as_deref())
        .bind(Json(&payload.name))
        .bind(Json(&payload.category))
        .bind(Json(&payload.contact))
        .bind(Json(&payload.address))
        .bind(Json(&payload.description))
        .bind(Json(&payload.operating_hours))
        .bind(payload.photos.as_ref().map(Json))
        .bind(Json(metadata))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    // Wholesale replacement of every field. Nested objects are written as
    // provided; there is no deep merge.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &BusinessPayload,
        metadata: &BusinessMetadata,
    ) -> Result<Option<Business>, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "UPDATE businesses SET \
             business_id = $2, name = $3, category = $4, contact = $5, address = $6, \
             description = $7, operating_hours = $8, photos = $9, metadata = $10, \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.business_id.as_deref())
        .bind(Json(&payload.name))
        .bind(Json(&payload.category))
        .bind(Json(&payload.contact))
        .bind(Json(&payload.address))
        .bind(Json(&payload.description))
        .bind(Json(&payload.operating_hours))
        .bind(payload.photos.as_ref().map(Json))
        .bind(Json(metadata))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Business::from))
    }

    // Metadata-only write, used by the soft-delete path.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        metadata: &BusinessMetadata,
    ) -> Result<Option<Business>, AppError> {
        let row = sqlx::query_as::<_, BusinessRow>(&format!(
            "UPDATE businesses SET metadata = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(metadata))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Business::from))
    }
}
