use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertPageDto {
    #[validate(length(max = 200, message = "Title must not exceed 200 characters"))]
    pub title: Option<String>,
    pub content: JsonValue,
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 100
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
