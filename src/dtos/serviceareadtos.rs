use serde::Deserialize;
use validator::Validate;

use crate::utils::numeric::lenient_bool;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceAreaDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 20, message = "Postcode must not exceed 20 characters"))]
    pub postcode: Option<String>,
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: Option<bool>,
}
