use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use super::{facademodel::FacadeDetail, floorplanmodel::FloorPlanDetail};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "listing_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    HouseLand,
    ReadyBuilt,
    DisplayHome,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Available,
    DepositTaken,
    Sold,
}

/// Marketing grouping shared by facades, listings and enquiries.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "collection")]
pub enum Collection {
    #[sqlx(rename = "V_Collection")]
    #[serde(rename = "V_Collection")]
    VCollection,
    #[sqlx(rename = "M_Collection")]
    #[serde(rename = "M_Collection")]
    MCollection,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::VCollection => "V_Collection",
            Collection::MCollection => "M_Collection",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub address: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub status: ListingStatus,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub collection: Option<Collection>,
    pub images: Json<Vec<String>>,
    pub land_size: Option<f64>,
    pub building_size: Option<f64>,
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_email: Option<String>,
    pub facade_id: Option<Uuid>,
    pub floorplan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A listing with its facade and floor plan eager-loaded.
#[derive(Debug, Serialize, Clone)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub facade: Option<FacadeDetail>,
    pub floorplan: Option<FloorPlanDetail>,
}
