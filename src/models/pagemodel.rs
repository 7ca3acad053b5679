use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// CMS copy for a marketing page, addressed by slug.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Page {
    pub slug: String,
    pub title: Option<String>,
    pub content: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
