use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{enquirymodel::EnquiryStatus, listingmodel::Collection},
    utils::{
        numeric::{blank_as_none, lenient_f64},
        pagination::Pagination,
    },
};

/// Form-specific fields, selected by the `type` the submitting form sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnquiryForm {
    #[serde(rename = "CONTACT_ENQUIRY")]
    Contact {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        preferred_contact: Option<String>,
    },

    #[serde(rename = "QUOTE_ENQUIRY")]
    Quote {
        #[serde(default, deserialize_with = "blank_as_none")]
        facade_id: Option<Uuid>,
        #[serde(default, deserialize_with = "blank_as_none")]
        floorplan_id: Option<Uuid>,
        #[serde(default)]
        upgrade_ids: Vec<Uuid>,
        #[serde(default, deserialize_with = "lenient_f64")]
        estimated_total: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },

    #[serde(rename = "EBOOK_ENQUIRY")]
    Ebook {},

    #[serde(rename = "MPORIUM_ENQUIRY")]
    Mporium {
        #[serde(default)]
        product: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl EnquiryForm {
    pub fn type_tag(&self) -> &'static str {
        match self {
            EnquiryForm::Contact { .. } => "CONTACT_ENQUIRY",
            EnquiryForm::Quote { .. } => "QUOTE_ENQUIRY",
            EnquiryForm::Ebook {} => "EBOOK_ENQUIRY",
            EnquiryForm::Mporium { .. } => "MPORIUM_ENQUIRY",
        }
    }

    pub fn is_ebook(&self) -> bool {
        matches!(self, EnquiryForm::Ebook {})
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            EnquiryForm::Contact { message, .. }
            | EnquiryForm::Quote { message, .. }
            | EnquiryForm::Mporium { message, .. } => message.as_deref(),
            EnquiryForm::Ebook {} => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEnquiryDto {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "Captcha is required"))]
    pub captcha: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(
        required(message = "Name is required"),
        length(max = 100, message = "Name must not exceed 100 characters")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 50, message = "Phone must not exceed 50 characters"))]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub collection: Option<Collection>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub listing_id: Option<Uuid>,

    #[serde(flatten)]
    pub form: EnquiryForm,
}

/// Validated enquiry ready to persist.
#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub collection: Option<Collection>,
    pub listing_id: Option<Uuid>,
    pub form: EnquiryForm,
}

impl CreateEnquiryDto {
    /// Drops the captcha answer; it is never stored.
    pub fn into_new_enquiry(self) -> Option<NewEnquiry> {
        Some(NewEnquiry {
            name: self.name?,
            email: self.email,
            phone: self.phone,
            collection: self.collection,
            listing_id: self.listing_id,
            form: self.form,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEnquiryStatusDto {
    pub status: EnquiryStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnquiryQueryDto {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<EnquiryStatus>,
    #[serde(default, rename = "type", deserialize_with = "blank_as_none")]
    pub enquiry_type: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl EnquiryQueryDto {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.page.as_deref(), self.limit.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ebook_enquiry_parses_without_extra_fields() {
        let dto: CreateEnquiryDto = serde_json::from_value(json!({
            "captcha": "X7kp2",
            "type": "EBOOK_ENQUIRY",
            "name": "Sam Lee",
            "email": "sam@example.com",
            "collection": "M_Collection",
            "utm_source": "ignored"
        }))
        .unwrap();

        assert!(dto.form.is_ebook());
        assert_eq!(dto.collection, Some(Collection::MCollection));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn quote_enquiry_keeps_typed_fields() {
        let facade = Uuid::new_v4();
        let dto: CreateEnquiryDto = serde_json::from_value(json!({
            "captcha": "abcde",
            "type": "QUOTE_ENQUIRY",
            "name": "Jo",
            "facade_id": facade,
            "floorplan_id": "",
            "estimated_total": "412500",
            "message": "Keen on the Hampton"
        }))
        .unwrap();

        match &dto.form {
            EnquiryForm::Quote {
                facade_id,
                floorplan_id,
                estimated_total,
                ..
            } => {
                assert_eq!(*facade_id, Some(facade));
                assert_eq!(*floorplan_id, None);
                assert_eq!(*estimated_total, Some(412500.0));
            }
            other => panic!("unexpected form {:?}", other),
        }
        assert_eq!(dto.form.message(), Some("Keen on the Hampton"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = serde_json::from_value::<CreateEnquiryDto>(json!({
            "captcha": "abcde",
            "type": "SPAM_ENQUIRY",
            "name": "Bot"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_name_and_captcha_fail_validation() {
        let dto: CreateEnquiryDto = serde_json::from_value(json!({
            "type": "CONTACT_ENQUIRY",
            "name": "",
            "email": "not-an-email"
        }))
        .unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("captcha"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn serialized_form_carries_its_type_tag() {
        let form = EnquiryForm::Mporium {
            product: Some("Pendant light".to_string()),
            message: None,
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["type"], "MPORIUM_ENQUIRY");
        assert_eq!(value["product"], "Pendant light");
        assert_eq!(form.type_tag(), "MPORIUM_ENQUIRY");
    }
}
