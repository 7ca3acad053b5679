use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::numeric::{lenient_bool, lenient_f64, lenient_i32};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpgradeGroupDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpgradeCategoryDto {
    pub group_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpgradeDto {
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_standard: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: Option<bool>,
}
