use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Setting {
    pub key: String,
    pub value: JsonValue,
    pub updated_at: DateTime<Utc>,
}
