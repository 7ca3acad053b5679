use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::DBClient,
    dtos::floorplandtos::FloorPlanDto,
    models::{
        facademodel::Facade,
        floorplanmodel::{FloorPlan, FloorPlanDetail, FloorPlanFilterOptions},
    },
    utils::pagination::Pagination,
};

/// Frontage, depth and stories match the facet value exactly; bedrooms is a minimum.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FloorPlanFilters {
    pub min_frontage: Option<f64>,
    pub min_depth: Option<f64>,
    pub stories: Option<i32>,
    pub bedrooms: Option<i32>,
}

impl FloorPlanFilters {
    fn push_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" FROM floorplans fp WHERE TRUE");

        if let Some(min_frontage) = self.min_frontage {
            qb.push(" AND fp.min_frontage = ");
            qb.push_bind(min_frontage);
        }
        if let Some(min_depth) = self.min_depth {
            qb.push(" AND fp.min_depth = ");
            qb.push_bind(min_depth);
        }
        if let Some(stories) = self.stories {
            qb.push(" AND fp.stories = ");
            qb.push_bind(stories);
        }
        if let Some(bedrooms) = self.bedrooms {
            qb.push(" AND fp.bedrooms >= ");
            qb.push_bind(bedrooms);
        }
    }
}

pub fn floorplan_page_query(
    filters: &FloorPlanFilters,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT fp.*");
    filters.push_where(&mut qb);
    qb.push(" ORDER BY fp.created_at DESC, fp.id DESC LIMIT ");
    qb.push_bind(pagination.limit());
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());
    qb
}

pub fn floorplan_count_query(filters: &FloorPlanFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    filters.push_where(&mut qb);
    qb
}

#[derive(Debug, FromRow)]
pub struct LinkedFacade {
    pub floorplan_id: Uuid,
    #[sqlx(flatten)]
    pub facade: Facade,
}

pub fn assemble_floorplan_details(
    floorplans: Vec<FloorPlan>,
    links: Vec<LinkedFacade>,
) -> Vec<FloorPlanDetail> {
    let mut details: Vec<FloorPlanDetail> = floorplans
        .into_iter()
        .map(|floorplan| FloorPlanDetail {
            floorplan,
            facades: Vec::new(),
        })
        .collect();

    for link in links {
        if let Some(detail) = details
            .iter_mut()
            .find(|d| d.floorplan.id == link.floorplan_id)
        {
            detail.facades.push(link.facade);
        }
    }

    details
}

#[async_trait]
pub trait FloorPlanExt {
    async fn get_floorplans(
        &self,
        filters: &FloorPlanFilters,
        pagination: Pagination,
    ) -> Result<(Vec<FloorPlanDetail>, i64), sqlx::Error>;

    async fn get_floorplan_filter_options(&self) -> Result<FloorPlanFilterOptions, sqlx::Error>;

    async fn get_floorplan(&self, floorplan_id: Uuid) -> Result<Option<FloorPlanDetail>, sqlx::Error>;

    async fn load_floorplan_details(
        &self,
        floorplan_ids: &[Uuid],
    ) -> Result<Vec<FloorPlanDetail>, sqlx::Error>;

    async fn create_floorplan(&self, dto: FloorPlanDto) -> Result<FloorPlan, sqlx::Error>;

    async fn update_floorplan(
        &self,
        floorplan_id: Uuid,
        dto: FloorPlanDto,
    ) -> Result<Option<FloorPlan>, sqlx::Error>;

    async fn delete_floorplan(&self, floorplan_id: Uuid) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl FloorPlanExt for DBClient {
    async fn get_floorplans(
        &self,
        filters: &FloorPlanFilters,
        pagination: Pagination,
    ) -> Result<(Vec<FloorPlanDetail>, i64), sqlx::Error> {
        let floorplans = floorplan_page_query(filters, pagination)
            .build_query_as::<FloorPlan>()
            .fetch_all(&self.pool)
            .await?;

        let total = floorplan_count_query(filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let ids: Vec<Uuid> = floorplans.iter().map(|fp| fp.id).collect();
        let links = self.linked_facades(&ids).await?;

        Ok((assemble_floorplan_details(floorplans, links), total))
    }

    async fn get_floorplan_filter_options(&self) -> Result<FloorPlanFilterOptions, sqlx::Error> {
        let min_frontage = sqlx::query_scalar::<_, f64>(
            "SELECT DISTINCT min_frontage FROM floorplans WHERE min_frontage IS NOT NULL ORDER BY min_frontage ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let min_depth = sqlx::query_scalar::<_, f64>(
            "SELECT DISTINCT min_depth FROM floorplans WHERE min_depth IS NOT NULL ORDER BY min_depth ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let stories = sqlx::query_scalar::<_, i32>(
            "SELECT DISTINCT stories FROM floorplans WHERE stories IS NOT NULL ORDER BY stories ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(FloorPlanFilterOptions {
            min_frontage,
            min_depth,
            stories,
        })
    }

    async fn get_floorplan(&self, floorplan_id: Uuid) -> Result<Option<FloorPlanDetail>, sqlx::Error> {
        Ok(self.load_floorplan_details(&[floorplan_id]).await?.pop())
    }

    async fn load_floorplan_details(
        &self,
        floorplan_ids: &[Uuid],
    ) -> Result<Vec<FloorPlanDetail>, sqlx::Error> {
        if floorplan_ids.is_empty() {
            return Ok(Vec::new());
        }

        let floorplans = sqlx::query_as::<_, FloorPlan>(
            "SELECT * FROM floorplans WHERE id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(floorplan_ids)
        .fetch_all(&self.pool)
        .await?;

        let links = self.linked_facades(floorplan_ids).await?;

        Ok(assemble_floorplan_details(floorplans, links))
    }

    async fn create_floorplan(&self, dto: FloorPlanDto) -> Result<FloorPlan, sqlx::Error> {
        sqlx::query_as::<_, FloorPlan>(
            r#"
            INSERT INTO floorplans (
                title, location, min_frontage, min_depth, total_area, living_area,
                garage_area, alfresco_area, porch_area, stories, bedrooms, bathrooms,
                car_spaces, price, image_url, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(dto.title)
        .bind(dto.location)
        .bind(dto.min_frontage)
        .bind(dto.min_depth)
        .bind(dto.total_area)
        .bind(dto.living_area)
        .bind(dto.garage_area)
        .bind(dto.alfresco_area)
        .bind(dto.porch_area)
        .bind(dto.stories)
        .bind(dto.bedrooms)
        .bind(dto.bathrooms)
        .bind(dto.car_spaces)
        .bind(dto.price)
        .bind(dto.image_url)
        .bind(dto.description)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_floorplan(
        &self,
        floorplan_id: Uuid,
        dto: FloorPlanDto,
    ) -> Result<Option<FloorPlan>, sqlx::Error> {
        sqlx::query_as::<_, FloorPlan>(
            r#"
            UPDATE floorplans SET
                title = $1, location = $2, min_frontage = $3, min_depth = $4,
                total_area = $5, living_area = $6, garage_area = $7, alfresco_area = $8,
                porch_area = $9, stories = $10, bedrooms = $11, bathrooms = $12,
                car_spaces = $13, price = $14, image_url = $15, description = $16,
                updated_at = NOW()
            WHERE id = $17
            RETURNING *
            "#,
        )
        .bind(dto.title)
        .bind(dto.location)
        .bind(dto.min_frontage)
        .bind(dto.min_depth)
        .bind(dto.total_area)
        .bind(dto.living_area)
        .bind(dto.garage_area)
        .bind(dto.alfresco_area)
        .bind(dto.porch_area)
        .bind(dto.stories)
        .bind(dto.bedrooms)
        .bind(dto.bathrooms)
        .bind(dto.car_spaces)
        .bind(dto.price)
        .bind(dto.image_url)
        .bind(dto.description)
        .bind(floorplan_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_floorplan(&self, floorplan_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM floorplans WHERE id = $1")
            .bind(floorplan_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl DBClient {
    async fn linked_facades(&self, floorplan_ids: &[Uuid]) -> Result<Vec<LinkedFacade>, sqlx::Error> {
        if floorplan_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, LinkedFacade>(
            r#"
            SELECT ff.floorplan_id, f.*
            FROM facade_floorplans ff
            INNER JOIN facades f ON f.id = ff.facade_id
            WHERE ff.floorplan_id = ANY($1)
            ORDER BY f.title ASC
            "#,
        )
        .bind(floorplan_ids)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facets_match_exactly_and_bedrooms_is_a_minimum() {
        let filters = FloorPlanFilters {
            min_frontage: Some(12.5),
            min_depth: None,
            stories: Some(1),
            bedrooms: Some(4),
        };
        assert_eq!(
            floorplan_count_query(&filters).sql(),
            "SELECT COUNT(*) FROM floorplans fp WHERE TRUE \
             AND fp.min_frontage = $1 AND fp.stories = $2 AND fp.bedrooms >= $3"
        );
    }

    #[test]
    fn page_query_binds_limit_after_filters() {
        let filters = FloorPlanFilters {
            bedrooms: Some(3),
            ..Default::default()
        };
        let qb = floorplan_page_query(&filters, Pagination::from_raw(Some("2"), Some("5")));
        assert!(qb.sql().ends_with("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn unlinked_plans_get_empty_facades() {
        let details = assemble_floorplan_details(Vec::new(), Vec::new());
        assert!(details.is_empty());
    }
}
