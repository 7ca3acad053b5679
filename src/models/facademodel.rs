use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{floorplanmodel::FloorPlan, listingmodel::Collection};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "variant_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    #[default]
    Facade,
    Interior,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Facade {
    pub id: Uuid,
    pub title: String,
    pub width: Option<f64>,
    pub image_url: Option<String>,
    pub stories: Option<i32>,
    pub is_active: bool,
    pub collection: Option<Collection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct FacadeVariant {
    pub id: Uuid,
    pub facade_id: Uuid,
    pub name: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub variant_type: VariantType,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct FacadeDetail {
    #[serde(flatten)]
    pub facade: Facade,
    pub floorplans: Vec<FloorPlan>,
    pub variants: Vec<FacadeVariant>,
}
