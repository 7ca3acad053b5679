use serde::Deserialize;
use validator::Validate;

use crate::utils::{
    numeric::{blank_as_none, lenient_i32},
    pagination::Pagination,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewDto {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "Name is required"),
        length(max = 100, message = "Name must not exceed 100 characters")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "Email is required"), email(message = "Email is invalid"))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(
        required(message = "Rating is required"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<i32>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "Comment is required"),
        length(max = 2000, message = "Comment must not exceed 2000 characters")
    )]
    pub comment: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "Captcha is required"))]
    pub captcha: Option<String>,
}

/// A review that passed validation, minus the captcha answer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub comment: String,
}

impl CreateReviewDto {
    pub fn into_new_review(self) -> Option<NewReview> {
        Some(NewReview {
            name: self.name?,
            email: self.email?,
            rating: self.rating?,
            comment: self.comment?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewApprovalDto {
    #[serde(rename = "isApproved", alias = "is_approved")]
    pub is_approved: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQueryDto {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ReviewQueryDto {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_field_is_required() {
        let dto: CreateReviewDto = serde_json::from_value(json!({
            "name": "Priya",
            "rating": "5",
            "comment": ""
        }))
        .unwrap();

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("comment"));
        assert!(fields.contains_key("captcha"));
        assert!(!fields.contains_key("name"));
        assert!(!fields.contains_key("rating"));
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let dto: CreateReviewDto = serde_json::from_value(json!({
            "name": "Priya",
            "email": "priya@example.com",
            "rating": 9,
            "comment": "Great build",
            "captcha": "abcde"
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn valid_review_converts() {
        let dto: CreateReviewDto = serde_json::from_value(json!({
            "name": "Priya",
            "email": "priya@example.com",
            "rating": 4,
            "comment": "Great build",
            "captcha": "abcde"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        let review = dto.into_new_review().unwrap();
        assert_eq!(review.rating, 4);
    }

    #[test]
    fn approval_accepts_camel_case() {
        let dto: ReviewApprovalDto = serde_json::from_value(json!({ "isApproved": true })).unwrap();
        assert!(dto.is_approved);
    }
}
