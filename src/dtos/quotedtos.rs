use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::utils::numeric::blank_as_none;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSharedQuoteDto {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub facade_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub floorplan_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 50, message = "Too many variants selected"))]
    pub variant_ids: Vec<Uuid>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Too many upgrades selected"))]
    pub upgrade_ids: Vec<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100, message = "Name must not exceed 100 characters"))]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Email is invalid"))]
    pub customer_email: Option<String>,
}
