use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::DBClient, dtos::serviceareadtos::ServiceAreaDto, models::serviceareamodel::ServiceArea};

#[async_trait]
pub trait ServiceAreaExt {
    async fn get_service_areas(&self, active_only: bool) -> Result<Vec<ServiceArea>, sqlx::Error>;

    async fn create_service_area(&self, dto: ServiceAreaDto) -> Result<ServiceArea, sqlx::Error>;

    async fn update_service_area(
        &self,
        area_id: Uuid,
        dto: ServiceAreaDto,
    ) -> Result<Option<ServiceArea>, sqlx::Error>;

    async fn delete_service_area(&self, area_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl ServiceAreaExt for DBClient {
    async fn get_service_areas(&self, active_only: bool) -> Result<Vec<ServiceArea>, sqlx::Error> {
        sqlx::query_as::<_, ServiceArea>(
            r#"
            SELECT * FROM service_areas
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY name ASC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_service_area(&self, dto: ServiceAreaDto) -> Result<ServiceArea, sqlx::Error> {
        sqlx::query_as::<_, ServiceArea>(
            r#"
            INSERT INTO service_areas (name, postcode, region, is_active)
            VALUES ($1, $2, $3, COALESCE($4, TRUE))
            RETURNING *
            "#,
        )
        .bind(dto.name)
        .bind(dto.postcode)
        .bind(dto.region)
        .bind(dto.is_active)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_service_area(
        &self,
        area_id: Uuid,
        dto: ServiceAreaDto,
    ) -> Result<Option<ServiceArea>, sqlx::Error> {
        sqlx::query_as::<_, ServiceArea>(
            r#"
            UPDATE service_areas SET
                name = $1, postcode = $2, region = $3,
                is_active = COALESCE($4, is_active), updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(dto.name)
        .bind(dto.postcode)
        .bind(dto.region)
        .bind(dto.is_active)
        .bind(area_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_service_area(&self, area_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM service_areas WHERE id = $1")
            .bind(area_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
