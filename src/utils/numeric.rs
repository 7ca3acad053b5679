// utils/numeric.rs
//
// Admin forms post numbers as JSON numbers, numeric strings or "" for a
// blank input. Every numeric DTO field goes through these helpers so a blank
// input is stored as NULL and never as NaN or an empty string.
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NumericError {
    #[error("expected a number, got \"{0}\"")]
    NotANumber(String),

    #[error("expected a whole number, got {0}")]
    NotAnInteger(f64),

    #[error("expected a number")]
    WrongType,
}

pub fn sanitize_number(value: &Value) -> Result<Option<f64>, NumericError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(Some)
            .ok_or(NumericError::WrongType),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Some)
                .ok_or_else(|| NumericError::NotANumber(raw.clone()))
        }
        _ => Err(NumericError::WrongType),
    }
}

pub fn sanitize_integer(value: &Value) -> Result<Option<i32>, NumericError> {
    match sanitize_number(value)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 => {
            Ok(Some(n as i32))
        }
        Some(n) => Err(NumericError::NotAnInteger(n)),
    }
}

pub fn sanitize_flag(value: &Value) -> Result<Option<bool>, NumericError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(NumericError::WrongType),
        },
        _ => Err(NumericError::WrongType),
    }
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    sanitize_number(&value).map_err(de::Error::custom)
}

pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    sanitize_integer(&value).map_err(de::Error::custom)
}

pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    sanitize_flag(&value).map_err(de::Error::custom)
}

/// Treats a blank string the same as an absent value, for enum filters and
/// optional selects posted by the admin forms.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(raw) if raw.trim().is_empty() => Ok(None),
        other => serde_json::from_value(other).map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct PriceForm {
        #[serde(default, deserialize_with = "lenient_f64")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "lenient_i32")]
        bedrooms: Option<i32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "snake_case")]
    enum Kind {
        HouseLand,
    }

    #[derive(Debug, Deserialize)]
    struct KindFilter {
        #[serde(default, deserialize_with = "blank_as_none")]
        kind: Option<Kind>,
    }

    #[test]
    fn blank_enum_filter_is_ignored() {
        let f: KindFilter = serde_json::from_value(json!({ "kind": "" })).unwrap();
        assert_eq!(f.kind, None);
        let f: KindFilter = serde_json::from_value(json!({ "kind": "house_land" })).unwrap();
        assert_eq!(f.kind, Some(Kind::HouseLand));
        assert!(serde_json::from_value::<KindFilter>(json!({ "kind": "castle" })).is_err());
    }

    #[test]
    fn blank_string_becomes_null() {
        assert_eq!(sanitize_number(&json!("")), Ok(None));
        assert_eq!(sanitize_number(&json!("   ")), Ok(None));
        assert_eq!(sanitize_number(&json!(null)), Ok(None));
    }

    #[test]
    fn numeric_strings_and_numbers_are_accepted() {
        assert_eq!(sanitize_number(&json!("450000")), Ok(Some(450000.0)));
        assert_eq!(sanitize_number(&json!(" 12.5 ")), Ok(Some(12.5)));
        assert_eq!(sanitize_number(&json!(99)), Ok(Some(99.0)));
    }

    #[test]
    fn garbage_is_rejected_instead_of_nan() {
        assert!(sanitize_number(&json!("abc")).is_err());
        assert!(sanitize_number(&json!("NaN")).is_err());
        assert!(sanitize_number(&json!([1])).is_err());
    }

    #[test]
    fn integers_must_be_whole() {
        assert_eq!(sanitize_integer(&json!("4")), Ok(Some(4)));
        assert_eq!(sanitize_integer(&json!(2.5)), Err(NumericError::NotAnInteger(2.5)));
    }

    #[test]
    fn flags_accept_string_forms() {
        assert_eq!(sanitize_flag(&json!("true")), Ok(Some(true)));
        assert_eq!(sanitize_flag(&json!("FALSE")), Ok(Some(false)));
        assert_eq!(sanitize_flag(&json!(true)), Ok(Some(true)));
        assert!(sanitize_flag(&json!("maybe")).is_err());
    }

    #[test]
    fn deserializer_handles_missing_and_blank_fields() {
        let form: PriceForm = serde_json::from_value(json!({ "price": "" })).unwrap();
        assert_eq!(form.price, None);
        assert_eq!(form.bedrooms, None);

        let form: PriceForm =
            serde_json::from_value(json!({ "price": "1200", "bedrooms": 3 })).unwrap();
        assert_eq!(form.price, Some(1200.0));
        assert_eq!(form.bedrooms, Some(3));

        assert!(serde_json::from_value::<PriceForm>(json!({ "price": "cheap" })).is_err());
    }
}
