use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::facademodel::Facade;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct FloorPlan {
    pub id: Uuid,
    pub title: String,
    pub location: Option<String>,

    // Lot requirements
    pub min_frontage: Option<f64>,
    pub min_depth: Option<f64>,

    // Area breakdown
    pub total_area: Option<f64>,
    pub living_area: Option<f64>,
    pub garage_area: Option<f64>,
    pub alfresco_area: Option<f64>,
    pub porch_area: Option<f64>,

    pub stories: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub car_spaces: Option<i32>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct FloorPlanDetail {
    #[serde(flatten)]
    pub floorplan: FloorPlan,
    pub facades: Vec<Facade>,
}

/// Distinct facet values for the floor plan filter dropdowns.
#[derive(Debug, Serialize, Default, PartialEq)]
pub struct FloorPlanFilterOptions {
    pub min_frontage: Vec<f64>,
    pub min_depth: Vec<f64>,
    pub stories: Vec<i32>,
}
