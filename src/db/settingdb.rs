use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::{db::DBClient, models::settingmodel::Setting};

#[async_trait]
pub trait SettingExt: Send + Sync {
    async fn get_settings(&self) -> Result<Vec<Setting>, sqlx::Error>;

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, sqlx::Error>;

    async fn upsert_setting(&self, key: &str, value: JsonValue) -> Result<Setting, sqlx::Error>;
}

#[async_trait]
impl SettingExt for DBClient {
    async fn get_settings(&self) -> Result<Vec<Setting>, sqlx::Error> {
        sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, sqlx::Error> {
        sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
    }

    async fn upsert_setting(&self, key: &str, value: JsonValue) -> Result<Setting, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await
    }
}
