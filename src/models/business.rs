use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Philippine phone number, flexible about separators: +63 or 0 prefix,
// then 3-3-4 digits.
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+63|0)?[\s.-]?\d{3}[\s.-]?\d{3}[\s.-]?\d{4}$")
        .expect("phone pattern must compile")
});

// Text stored in both directory languages. The data languages are
// independent of the UI locale prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct BilingualText {
    #[validate(length(min = 1, message = "English text is required."))]
    pub english: String,
    #[validate(length(min = 1, message = "Tagalog text is required."))]
    pub tagalog: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Category {
    #[validate(length(min = 1, message = "Primary category is required."))]
    pub primary: String,
    pub secondary: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Contact {
    #[validate(regex(
        path = *PHONE_REGEX,
        message = "Please enter a valid Philippine phone number."
    ))]
    pub phone: String,
    #[validate(email(message = "Invalid email."))]
    pub email: Option<String>,
    #[validate(url(message = "Invalid URL."))]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90."))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180."
    ))]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Address {
    #[validate(length(min = 1, message = "Street address is required."))]
    pub street: String,
    #[validate(length(min = 1, message = "Barangay is required."))]
    pub barangay: String,
    #[validate(nested)]
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayHours {
    pub open: String,
    pub close: String,
    pub closed: bool,
}

// All seven days are required; a partial week is rejected structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OperatingHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    pub alt: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    Active,
    Inactive,
    Pending,
}

// Listing metadata as persisted. Both timestamps are owned by the server:
// `date_added` is stamped once at insert, `last_updated` on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetadata {
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_verified: bool,
    pub status: BusinessStatus,
    pub target: Option<String>,
    pub limit: Option<String>,
    pub reviewer: Option<String>,
}

// The metadata a caller may set. Timestamps are never accepted from the
// client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetadataPayload {
    pub is_verified: bool,
    pub status: BusinessStatus,
    pub target: Option<String>,
    pub limit: Option<String>,
    pub reviewer: Option<String>,
}

// One directory listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: Uuid,
    pub business_id: Option<String>,
    pub name: BilingualText,
    pub category: Category,
    pub contact: Contact,
    pub address: Address,
    pub description: BilingualText,
    pub operating_hours: OperatingHours,
    pub photos: Option<Vec<Photo>>,
    pub metadata: BusinessMetadata,
}

// Create/update input. Updates replace every field wholesale; nested
// objects must be resubmitted in full, there is no deep merge.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPayload {
    pub business_id: Option<String>,
    #[validate(nested)]
    pub name: BilingualText,
    #[validate(nested)]
    pub category: Category,
    #[validate(nested)]
    pub contact: Contact,
    #[validate(nested)]
    pub address: Address,
    #[validate(custom(function = validate_description))]
    pub description: BilingualText,
    pub operating_hours: OperatingHours,
    pub photos: Option<Vec<Photo>>,
    pub metadata: BusinessMetadataPayload,
}

fn validate_description(description: &BilingualText) -> Result<(), ValidationError> {
    if description.english.chars().count() < 10 || description.tagalog.chars().count() < 10 {
        return Err(ValidationError::new("description_too_short")
            .with_message("Description must be at least 10 characters.".into()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn day() -> DayHours {
        DayHours {
            open: "08:00".to_string(),
            close: "17:00".to_string(),
            closed: false,
        }
    }

    pub(crate) fn sample_payload() -> BusinessPayload {
        BusinessPayload {
            business_id: Some("GLC-0001".to_string()),
            name: BilingualText {
                english: "Gloria Bakery".to_string(),
                tagalog: "Panaderya ng Gloria".to_string(),
            },
            category: Category {
                primary: "food".to_string(),
                secondary: Some(vec!["bakery".to_string()]),
            },
            contact: Contact {
                phone: "+63 912 345 6789".to_string(),
                email: Some("hello@gloriabakery.ph".to_string()),
                website: Some("https://gloriabakery.ph".to_string()),
            },
            address: Address {
                street: "12 Rizal St".to_string(),
                barangay: "Poblacion".to_string(),
                coordinates: Coordinates {
                    latitude: 15.1449,
                    longitude: 120.3509,
                },
            },
            description: BilingualText {
                english: "Fresh pandesal and pastries every morning.".to_string(),
                tagalog: "Sariwang pandesal at mga pastry tuwing umaga.".to_string(),
            },
            operating_hours: OperatingHours {
                monday: day(),
                tuesday: day(),
                wednesday: day(),
                thursday: day(),
                friday: day(),
                saturday: day(),
                sunday: DayHours {
                    open: String::new(),
                    close: String::new(),
                    closed: true,
                },
            },
            photos: Some(vec![Photo {
                url: "https://example.com/storefront.jpg".to_string(),
                alt: "Storefront".to_string(),
                is_primary: true,
            }]),
            metadata: BusinessMetadataPayload {
                is_verified: false,
                status: BusinessStatus::Pending,
                target: None,
                limit: None,
                reviewer: None,
            },
        }
    }

    #[test]
    fn a_complete_payload_validates() {
        assert!(sample_payload().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut payload = sample_payload();
        payload.address.coordinates.latitude = 200.0;
        assert!(payload.validate().is_err());

        let mut payload = sample_payload();
        payload.address.coordinates.longitude = -181.0;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn rejects_non_philippine_phone() {
        let mut payload = sample_payload();
        payload.contact.phone = "12345".to_string();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn accepts_common_phone_spellings() {
        for phone in ["09123456789", "0912-345-6789", "+63 912 345 6789"] {
            let mut payload = sample_payload();
            payload.contact.phone = phone.to_string();
            assert!(payload.validate().is_ok(), "{phone} should be accepted");
        }
    }

    #[test]
    fn rejects_short_descriptions() {
        let mut payload = sample_payload();
        payload.description.tagalog = "maikli".to_string();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn rejects_missing_bilingual_name() {
        let mut payload = sample_payload();
        payload.name.tagalog = String::new();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BusinessStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
