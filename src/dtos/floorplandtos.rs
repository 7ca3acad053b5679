use serde::Deserialize;
use validator::Validate;

use crate::{
    db::floorplandb::FloorPlanFilters,
    utils::{
        numeric::{lenient_f64, lenient_i32},
        pagination::Pagination,
    },
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FloorPlanDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_frontage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_depth: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub living_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub garage_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alfresco_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub porch_area: Option<f64>,

    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(range(min = 1, max = 4, message = "Stories must be between 1 and 4"))]
    pub stories: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(range(min = 0, message = "Bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(range(min = 0, message = "Car spaces cannot be negative"))]
    pub car_spaces: Option<i32>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,

    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FloorPlanQueryDto {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_frontage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min_depth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub stories: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub bedrooms: Option<i32>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl FloorPlanQueryDto {
    pub fn filters(&self) -> FloorPlanFilters {
        FloorPlanFilters {
            min_frontage: self.min_frontage,
            min_depth: self.min_depth,
            stories: self.stories,
            bedrooms: self.bedrooms,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn area_breakdown_accepts_form_strings() {
        let dto: FloorPlanDto = serde_json::from_value(json!({
            "title": "Ashby 28",
            "min_frontage": "12.5",
            "min_depth": 28,
            "living_area": "",
            "stories": "2",
            "bedrooms": 4
        }))
        .unwrap();

        assert_eq!(dto.min_frontage, Some(12.5));
        assert_eq!(dto.min_depth, Some(28.0));
        assert_eq!(dto.living_area, None);
        assert_eq!(dto.stories, Some(2));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn negative_bedrooms_fail_validation() {
        let dto: FloorPlanDto =
            serde_json::from_value(json!({ "title": "Ashby", "bedrooms": -1 })).unwrap();
        assert!(dto.validate().is_err());
    }
}
