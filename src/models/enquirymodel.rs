use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::listingmodel::Collection;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "enquiry_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Enquiry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub enquiry_type: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub collection: Option<Collection>,
    pub listing_id: Option<Uuid>,
    pub status: EnquiryStatus,
    /// Form-specific fields, stored as the serialized `EnquiryForm`.
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
