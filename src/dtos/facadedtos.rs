use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    db::facadedb::FacadeFilters,
    models::{facademodel::VariantType, listingmodel::Collection},
    utils::{
        numeric::{blank_as_none, lenient_bool, lenient_f64, lenient_i32},
        pagination::Pagination,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FacadeVariantDto {
    #[validate(length(min = 1, max = 200, message = "Variant name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    pub image_url: Option<String>,

    #[serde(default, rename = "type")]
    pub variant_type: VariantType,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FacadeDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub width: Option<f64>,

    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_i32")]
    pub stories: Option<i32>,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub collection: Option<Collection>,

    /// When present, replaces the facade's floor plan links.
    #[serde(default)]
    pub floorplan_ids: Option<Vec<Uuid>>,

    /// When present, replaces all of the facade's variants.
    #[serde(default)]
    pub variants: Option<Vec<FacadeVariantDto>>,
}

impl FacadeDto {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        if let Some(variants) = &self.variants {
            for variant in variants {
                variant.validate()?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FacadeQueryDto {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub stories: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub floorplan_id: Option<Uuid>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl FacadeQueryDto {
    pub fn filters(&self) -> FacadeFilters {
        FacadeFilters {
            is_active: self.is_active,
            stories: self.stories,
            floorplan_id: self.floorplan_id,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}
