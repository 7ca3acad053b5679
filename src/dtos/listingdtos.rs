use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::listingdb::ListingFilters,
    models::listingmodel::{Collection, ListingStatus, ListingType},
    utils::{
        numeric::{blank_as_none, lenient_f64, lenient_i32},
        pagination::Pagination,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListingDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Address must not exceed 500 characters"))]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    #[serde(rename = "type", alias = "listing_type")]
    pub listing_type: ListingType,

    #[serde(default)]
    pub status: ListingStatus,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub collection: Option<Collection>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub land_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub building_size: Option<f64>,

    // Agent contact
    pub agent_name: Option<String>,
    pub agent_phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Agent email is invalid"))]
    pub agent_email: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub facade_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub floorplan_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQueryDto {
    #[serde(default, rename = "type", deserialize_with = "blank_as_none")]
    pub listing_type: Option<ListingType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub collection: Option<Collection>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub beds: Option<i32>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListingQueryDto {
    pub fn filters(&self) -> ListingFilters {
        ListingFilters {
            listing_type: self.listing_type,
            collection: self.collection,
            min_price: self.min_price,
            max_price: self.max_price,
            beds: self.beds,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}
