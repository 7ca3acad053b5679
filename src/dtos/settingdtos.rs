use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertSettingDto {
    #[validate(length(min = 1, max = 100, message = "Key is required"))]
    pub key: String,
    pub value: JsonValue,
}
