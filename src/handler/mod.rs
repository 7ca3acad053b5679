pub mod auth;
pub mod captcha;
pub mod enquiries;
pub mod facades;
pub mod floorplans;
pub mod listings;
pub mod pages;
pub mod quotes;
pub mod reviews;
pub mod service_areas;
pub mod settings;
pub mod upgrades;
pub mod upload;

use crate::dtos::userdtos::Response;

pub fn deleted(what: &str) -> Response {
    Response {
        status: "success",
        message: format!("{} deleted successfully", what),
    }
}
