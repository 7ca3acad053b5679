use std::{str::FromStr, sync::Arc};

use serde_json::{Map, Value as JsonValue};

use crate::{
    db::settingdb::SettingExt,
    service::error::ServiceError,
    utils::numeric::sanitize_flag,
};

/// Site settings an admin may change. Anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AdminEmail,
    AutoApproveReviews,
    BrochureUrl,
    PriceListUrl,
    InclusionsUrl,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::AdminEmail => "adminEmail",
            SettingKey::AutoApproveReviews => "autoApproveReviews",
            SettingKey::BrochureUrl => "brochureUrl",
            SettingKey::PriceListUrl => "priceListUrl",
            SettingKey::InclusionsUrl => "inclusionsUrl",
        }
    }

    /// Checks the value's type and returns the form that gets stored.
    pub fn normalize(&self, value: JsonValue) -> Result<JsonValue, ServiceError> {
        match self {
            SettingKey::AutoApproveReviews => match sanitize_flag(&value) {
                Ok(Some(flag)) => Ok(JsonValue::Bool(flag)),
                _ => Err(ServiceError::Validation(format!(
                    "{} must be true or false",
                    self.as_str()
                ))),
            },
            SettingKey::AdminEmail => {
                let email = self.string_value(value)?;
                if !email.is_empty() && !validator::validate_email(email.as_str()) {
                    return Err(ServiceError::Validation(format!(
                        "{} must be a valid email address",
                        self.as_str()
                    )));
                }
                Ok(JsonValue::String(email))
            }
            SettingKey::BrochureUrl | SettingKey::PriceListUrl | SettingKey::InclusionsUrl => {
                Ok(JsonValue::String(self.string_value(value)?))
            }
        }
    }

    fn string_value(&self, value: JsonValue) -> Result<String, ServiceError> {
        match value {
            JsonValue::Null => Ok(String::new()),
            JsonValue::String(s) => Ok(s.trim().to_string()),
            _ => Err(ServiceError::Validation(format!(
                "{} must be a string",
                self.as_str()
            ))),
        }
    }
}

impl FromStr for SettingKey {
    type Err = ServiceError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "adminEmail" => Ok(SettingKey::AdminEmail),
            "autoApproveReviews" => Ok(SettingKey::AutoApproveReviews),
            "brochureUrl" => Ok(SettingKey::BrochureUrl),
            "priceListUrl" => Ok(SettingKey::PriceListUrl),
            "inclusionsUrl" => Ok(SettingKey::InclusionsUrl),
            other => Err(ServiceError::Validation(format!("Unknown setting key: {}", other))),
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingExt>,
    fallback_admin_email: Option<String>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingExt>, fallback_admin_email: Option<String>) -> Self {
        Self {
            store,
            fallback_admin_email,
        }
    }

    pub async fn all(&self) -> Result<Map<String, JsonValue>, ServiceError> {
        let settings = self.store.get_settings().await?;
        Ok(settings
            .into_iter()
            .map(|setting| (setting.key, setting.value))
            .collect())
    }

    pub async fn set(&self, key: &str, value: JsonValue) -> Result<JsonValue, ServiceError> {
        let key = SettingKey::from_str(key)?;
        let value = key.normalize(value)?;
        let saved = self.store.upsert_setting(key.as_str(), value).await?;
        Ok(saved.value)
    }

    /// The configured recipient for admin alerts, falling back to `ADMIN_EMAIL`.
    pub async fn admin_email(&self) -> Result<Option<String>, ServiceError> {
        let stored = self
            .store
            .get_setting(SettingKey::AdminEmail.as_str())
            .await?
            .and_then(|setting| setting.value.as_str().map(str::trim).map(str::to_string))
            .filter(|email| !email.is_empty());

        Ok(stored.or_else(|| self.fallback_admin_email.clone()))
    }

    /// Accepts a stored boolean or its string form; anything else means off.
    pub async fn auto_approve_reviews(&self) -> Result<bool, ServiceError> {
        let setting = self
            .store
            .get_setting(SettingKey::AutoApproveReviews.as_str())
            .await?;

        Ok(setting
            .and_then(|setting| sanitize_flag(&setting.value).ok().flatten())
            .unwrap_or(false))
    }
}

#[cfg(test)]
pub mod tests {
    use std::{collections::BTreeMap, sync::Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::models::settingmodel::Setting;

    #[derive(Default)]
    pub struct MemorySettings {
        values: Mutex<BTreeMap<String, JsonValue>>,
    }

    impl MemorySettings {
        pub fn with(entries: &[(&str, JsonValue)]) -> Self {
            let store = MemorySettings::default();
            {
                let mut values = store.values.lock().unwrap();
                for (key, value) in entries {
                    values.insert(key.to_string(), value.clone());
                }
            }
            store
        }
    }

    fn row(key: &str, value: JsonValue) -> Setting {
        Setting {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl SettingExt for MemorySettings {
        async fn get_settings(&self) -> Result<Vec<Setting>, sqlx::Error> {
            let values = self.values.lock().unwrap();
            Ok(values.iter().map(|(k, v)| row(k, v.clone())).collect())
        }

        async fn get_setting(&self, key: &str) -> Result<Option<Setting>, sqlx::Error> {
            let values = self.values.lock().unwrap();
            Ok(values.get(key).map(|v| row(key, v.clone())))
        }

        async fn upsert_setting(&self, key: &str, value: JsonValue) -> Result<Setting, sqlx::Error> {
            let mut values = self.values.lock().unwrap();
            values.insert(key.to_string(), value.clone());
            Ok(row(key, value))
        }
    }

    fn service(store: MemorySettings, fallback: Option<&str>) -> SettingsService {
        SettingsService::new(Arc::new(store), fallback.map(str::to_string))
    }

    #[tokio::test]
    async fn auto_approve_accepts_boolean_and_string_forms() {
        let on = service(MemorySettings::with(&[("autoApproveReviews", json!("true"))]), None);
        assert!(on.auto_approve_reviews().await.unwrap());

        let on = service(MemorySettings::with(&[("autoApproveReviews", json!(true))]), None);
        assert!(on.auto_approve_reviews().await.unwrap());

        let off = service(MemorySettings::with(&[("autoApproveReviews", json!("yes please"))]), None);
        assert!(!off.auto_approve_reviews().await.unwrap());

        let unset = service(MemorySettings::default(), None);
        assert!(!unset.auto_approve_reviews().await.unwrap());
    }

    #[tokio::test]
    async fn set_stores_normalized_values() {
        let settings = service(MemorySettings::default(), None);

        let stored = settings.set("autoApproveReviews", json!("TRUE")).await.unwrap();
        assert_eq!(stored, json!(true));

        let stored = settings.set("brochureUrl", json!("  /uploads/docs/b.pdf ")).await.unwrap();
        assert_eq!(stored, json!("/uploads/docs/b.pdf"));

        let all = settings.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["autoApproveReviews"], json!(true));
    }

    #[tokio::test]
    async fn unknown_keys_and_bad_values_are_rejected() {
        let settings = service(MemorySettings::default(), None);

        assert!(matches!(
            settings.set("theme", json!("dark")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            settings.set("adminEmail", json!("not-an-email")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            settings.set("autoApproveReviews", json!(5)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(settings.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_email_falls_back_to_config() {
        let configured = service(
            MemorySettings::with(&[("adminEmail", json!("sales@example.com"))]),
            Some("ops@example.com"),
        );
        assert_eq!(
            configured.admin_email().await.unwrap().as_deref(),
            Some("sales@example.com")
        );

        let blank = service(
            MemorySettings::with(&[("adminEmail", json!(""))]),
            Some("ops@example.com"),
        );
        assert_eq!(blank.admin_email().await.unwrap().as_deref(), Some("ops@example.com"));

        let neither = service(MemorySettings::default(), None);
        assert_eq!(neither.admin_email().await.unwrap(), None);
    }
}
