use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::{
    db::{unique_ids, DBClient},
    dtos::facadedtos::{FacadeDto, FacadeVariantDto},
    models::{
        facademodel::{Facade, FacadeDetail, FacadeVariant},
        floorplanmodel::FloorPlan,
    },
    utils::pagination::Pagination,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FacadeFilters {
    pub is_active: Option<bool>,
    pub stories: Option<i32>,
    /// Only facades linked to this floor plan.
    pub floorplan_id: Option<Uuid>,
}

impl FacadeFilters {
    fn push_from_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" FROM facades f");

        if let Some(floorplan_id) = self.floorplan_id {
            qb.push(" INNER JOIN facade_floorplans ff ON ff.facade_id = f.id AND ff.floorplan_id = ");
            qb.push_bind(floorplan_id);
        }

        qb.push(" WHERE TRUE");

        if let Some(is_active) = self.is_active {
            qb.push(" AND f.is_active = ");
            qb.push_bind(is_active);
        }
        if let Some(stories) = self.stories {
            qb.push(" AND f.stories = ");
            qb.push_bind(stories);
        }
    }
}

pub fn facade_page_query(
    filters: &FacadeFilters,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT f.*");
    filters.push_from_where(&mut qb);
    qb.push(" ORDER BY f.created_at DESC, f.id DESC LIMIT ");
    qb.push_bind(pagination.limit());
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());
    qb
}

pub fn facade_count_query(filters: &FacadeFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(DISTINCT f.id)");
    filters.push_from_where(&mut qb);
    qb
}

#[derive(Debug, FromRow)]
pub struct LinkedFloorPlan {
    pub facade_id: Uuid,
    #[sqlx(flatten)]
    pub floorplan: FloorPlan,
}

/// Groups floor plan links and variants under their facades, keeping the
/// order of `facades`.
pub fn assemble_facade_details(
    facades: Vec<Facade>,
    links: Vec<LinkedFloorPlan>,
    variants: Vec<FacadeVariant>,
) -> Vec<FacadeDetail> {
    let mut details: Vec<FacadeDetail> = facades
        .into_iter()
        .map(|facade| FacadeDetail {
            facade,
            floorplans: Vec::new(),
            variants: Vec::new(),
        })
        .collect();

    for link in links {
        if let Some(detail) = details.iter_mut().find(|d| d.facade.id == link.facade_id) {
            detail.floorplans.push(link.floorplan);
        }
    }

    for variant in variants {
        if let Some(detail) = details.iter_mut().find(|d| d.facade.id == variant.facade_id) {
            detail.variants.push(variant);
        }
    }

    details
}

#[async_trait]
pub trait FacadeExt {
    async fn get_facades(
        &self,
        filters: &FacadeFilters,
        pagination: Pagination,
    ) -> Result<(Vec<FacadeDetail>, i64), sqlx::Error>;

    async fn get_facade(&self, facade_id: Uuid) -> Result<Option<FacadeDetail>, sqlx::Error>;

    async fn load_facade_details(&self, facade_ids: &[Uuid]) -> Result<Vec<FacadeDetail>, sqlx::Error>;

    async fn create_facade(&self, dto: FacadeDto) -> Result<FacadeDetail, sqlx::Error>;

    async fn update_facade(
        &self,
        facade_id: Uuid,
        dto: FacadeDto,
    ) -> Result<Option<FacadeDetail>, sqlx::Error>;

    async fn delete_facade(&self, facade_id: Uuid) -> Result<bool, sqlx::Error>;
}

/// Replaces the facade's floor plan links with `floorplan_ids`.
async fn replace_floorplan_links(
    tx: &mut Transaction<'_, Postgres>,
    facade_id: Uuid,
    floorplan_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM facade_floorplans WHERE facade_id = $1")
        .bind(facade_id)
        .execute(&mut **tx)
        .await?;

    let floorplan_ids = unique_ids(floorplan_ids.iter().copied());
    if floorplan_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO facade_floorplans (facade_id, floorplan_id)
        SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(facade_id)
    .bind(floorplan_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Deletes every variant of the facade and recreates the submitted list.
/// Variant ids are not preserved.
async fn replace_variants(
    tx: &mut Transaction<'_, Postgres>,
    facade_id: Uuid,
    variants: &[FacadeVariantDto],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM facade_variants WHERE facade_id = $1")
        .bind(facade_id)
        .execute(&mut **tx)
        .await?;

    if variants.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO facade_variants (facade_id, name, price, image_url, variant_type, position) ",
    );
    qb.push_values(variants.iter().enumerate(), |mut row, (position, variant)| {
        row.push_bind(facade_id)
            .push_bind(variant.name.clone())
            .push_bind(variant.price)
            .push_bind(variant.image_url.clone())
            .push_bind(variant.variant_type)
            .push_bind(position as i32);
    });
    qb.build().execute(&mut **tx).await?;

    Ok(())
}

async fn sync_associations(
    tx: &mut Transaction<'_, Postgres>,
    facade_id: Uuid,
    dto: &FacadeDto,
) -> Result<(), sqlx::Error> {
    if let Some(floorplan_ids) = &dto.floorplan_ids {
        replace_floorplan_links(tx, facade_id, floorplan_ids).await?;
    }
    if let Some(variants) = &dto.variants {
        replace_variants(tx, facade_id, variants).await?;
    }
    Ok(())
}

#[async_trait]
impl FacadeExt for DBClient {
    async fn get_facades(
        &self,
        filters: &FacadeFilters,
        pagination: Pagination,
    ) -> Result<(Vec<FacadeDetail>, i64), sqlx::Error> {
        let facades = facade_page_query(filters, pagination)
            .build_query_as::<Facade>()
            .fetch_all(&self.pool)
            .await?;

        let total = facade_count_query(filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let ids: Vec<Uuid> = facades.iter().map(|f| f.id).collect();
        let links = self.linked_floorplans(&ids).await?;
        let variants = self.variants_for(&ids).await?;

        Ok((assemble_facade_details(facades, links, variants), total))
    }

    async fn get_facade(&self, facade_id: Uuid) -> Result<Option<FacadeDetail>, sqlx::Error> {
        Ok(self.load_facade_details(&[facade_id]).await?.pop())
    }

    async fn load_facade_details(&self, facade_ids: &[Uuid]) -> Result<Vec<FacadeDetail>, sqlx::Error> {
        if facade_ids.is_empty() {
            return Ok(Vec::new());
        }

        let facades = sqlx::query_as::<_, Facade>(
            "SELECT * FROM facades WHERE id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(facade_ids)
        .fetch_all(&self.pool)
        .await?;

        let links = self.linked_floorplans(facade_ids).await?;
        let variants = self.variants_for(facade_ids).await?;

        Ok(assemble_facade_details(facades, links, variants))
    }

    async fn create_facade(&self, dto: FacadeDto) -> Result<FacadeDetail, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let facade = sqlx::query_as::<_, Facade>(
            r#"
            INSERT INTO facades (title, width, image_url, stories, is_active, collection)
            VALUES ($1, $2, $3, $4, COALESCE($5, TRUE), $6)
            RETURNING *
            "#,
        )
        .bind(&dto.title)
        .bind(dto.width)
        .bind(&dto.image_url)
        .bind(dto.stories)
        .bind(dto.is_active)
        .bind(dto.collection)
        .fetch_one(&mut *tx)
        .await?;

        sync_associations(&mut tx, facade.id, &dto).await?;
        tx.commit().await?;

        self.get_facade(facade.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_facade(
        &self,
        facade_id: Uuid,
        dto: FacadeDto,
    ) -> Result<Option<FacadeDetail>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes concurrent edits of one facade.
        let facade = sqlx::query_as::<_, Facade>(
            r#"
            UPDATE facades SET
                title = $1, width = $2, image_url = $3, stories = $4,
                is_active = COALESCE($5, is_active), collection = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&dto.title)
        .bind(dto.width)
        .bind(&dto.image_url)
        .bind(dto.stories)
        .bind(dto.is_active)
        .bind(dto.collection)
        .bind(facade_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(facade) = facade else {
            return Ok(None);
        };

        sync_associations(&mut tx, facade.id, &dto).await?;
        tx.commit().await?;

        self.get_facade(facade.id).await
    }

    async fn delete_facade(&self, facade_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM facades WHERE id = $1")
            .bind(facade_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl DBClient {
    async fn linked_floorplans(&self, facade_ids: &[Uuid]) -> Result<Vec<LinkedFloorPlan>, sqlx::Error> {
        if facade_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, LinkedFloorPlan>(
            r#"
            SELECT ff.facade_id, fp.*
            FROM facade_floorplans ff
            INNER JOIN floorplans fp ON fp.id = ff.floorplan_id
            WHERE ff.facade_id = ANY($1)
            ORDER BY fp.title ASC
            "#,
        )
        .bind(facade_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn variants_for(&self, facade_ids: &[Uuid]) -> Result<Vec<FacadeVariant>, sqlx::Error> {
        if facade_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, FacadeVariant>(
            "SELECT * FROM facade_variants WHERE facade_id = ANY($1) ORDER BY position ASC, created_at ASC",
        )
        .bind(facade_ids)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sqlx::PgPool;

    use crate::{
        db::floorplandb::FloorPlanExt, dtos::floorplandtos::FloorPlanDto,
        models::facademodel::VariantType,
    };

    fn facade(title: &str) -> Facade {
        Facade {
            id: Uuid::new_v4(),
            title: title.to_string(),
            width: Some(12.0),
            image_url: None,
            stories: Some(1),
            is_active: true,
            collection: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn floorplan(title: &str) -> FloorPlan {
        FloorPlan {
            id: Uuid::new_v4(),
            title: title.to_string(),
            location: None,
            min_frontage: Some(12.5),
            min_depth: Some(28.0),
            total_area: None,
            living_area: None,
            garage_area: None,
            alfresco_area: None,
            porch_area: None,
            stories: Some(1),
            bedrooms: Some(4),
            bathrooms: Some(2),
            car_spaces: Some(2),
            price: Some(289_000.0),
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(facade_id: Uuid, name: &str) -> FacadeVariant {
        FacadeVariant {
            id: Uuid::new_v4(),
            facade_id,
            name: name.to_string(),
            price: Some(500.0),
            image_url: Some("x".to_string()),
            variant_type: VariantType::Facade,
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn details_keep_facade_order_and_attach_children() {
        let hampton = facade("Hampton");
        let coastal = facade("Coastal");
        let ashby = floorplan("Ashby");
        let links = vec![
            LinkedFloorPlan {
                facade_id: coastal.id,
                floorplan: ashby.clone(),
            },
            LinkedFloorPlan {
                facade_id: hampton.id,
                floorplan: ashby,
            },
        ];
        let variants = vec![variant(hampton.id, "Dark"), variant(hampton.id, "Light")];

        let details = assemble_facade_details(vec![hampton.clone(), coastal.clone()], links, variants);

        assert_eq!(details[0].facade.title, "Hampton");
        assert_eq!(details[0].floorplans.len(), 1);
        assert_eq!(details[0].variants.len(), 2);
        assert_eq!(details[1].facade.title, "Coastal");
        assert_eq!(details[1].floorplans[0].title, "Ashby");
        assert!(details[1].variants.is_empty());
    }

    #[test]
    fn floorplan_filter_joins_through_link_table() {
        let floorplan_id = Uuid::new_v4();
        let filters = FacadeFilters {
            is_active: Some(true),
            stories: Some(2),
            floorplan_id: Some(floorplan_id),
        };
        let sql = facade_count_query(&filters).sql().to_string();
        assert_eq!(
            sql,
            "SELECT COUNT(DISTINCT f.id) FROM facades f \
             INNER JOIN facade_floorplans ff ON ff.facade_id = f.id AND ff.floorplan_id = $1 \
             WHERE TRUE AND f.is_active = $2 AND f.stories = $3"
        );
    }

    #[test]
    fn facade_page_is_newest_first() {
        let qb = facade_page_query(&FacadeFilters::default(), Pagination::default());
        assert_eq!(
            qb.sql(),
            "SELECT f.* FROM facades f WHERE TRUE ORDER BY f.created_at DESC, f.id DESC LIMIT $1 OFFSET $2"
        );
    }

    async fn seed_floorplans(db: &DBClient, titles: &[&str]) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for title in titles {
            let dto: FloorPlanDto = serde_json::from_value(json!({ "title": title })).unwrap();
            ids.push(db.create_floorplan(dto).await.unwrap().id);
        }
        ids
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_facade_stores_links_and_variants(pool: PgPool) {
        let db = DBClient::new(pool);
        let floorplan_ids = seed_floorplans(&db, &["Ashby", "Brighton"]).await;

        let dto: FacadeDto = serde_json::from_value(json!({
            "title": "Hampton",
            "floorplan_ids": floorplan_ids,
            "variants": [{ "name": "Dark", "price": "500", "image_url": "x" }],
        }))
        .unwrap();
        let created = db.create_facade(dto).await.unwrap();

        let fetched = db.get_facade(created.facade.id).await.unwrap().unwrap();
        assert_eq!(fetched.floorplans.len(), 2);
        let variants: Vec<_> = fetched
            .variants
            .iter()
            .map(|v| (v.name.as_str(), v.price, v.image_url.as_deref(), v.variant_type))
            .collect();
        assert_eq!(variants, vec![("Dark", Some(500.0), Some("x"), VariantType::Facade)]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn empty_variant_list_removes_all_and_keeps_links(pool: PgPool) {
        let db = DBClient::new(pool);
        let floorplan_ids = seed_floorplans(&db, &["Ashby", "Brighton"]).await;

        let dto: FacadeDto = serde_json::from_value(json!({
            "title": "Hampton",
            "floorplan_ids": floorplan_ids,
            "variants": [{ "name": "Dark" }, { "name": "Light", "type": "interior" }],
        }))
        .unwrap();
        let created = db.create_facade(dto).await.unwrap();
        assert_eq!(created.variants.len(), 2);

        let dto: FacadeDto =
            serde_json::from_value(json!({ "title": "Hampton", "variants": [] })).unwrap();
        let updated = db.update_facade(created.facade.id, dto).await.unwrap().unwrap();

        assert!(updated.variants.is_empty());
        assert_eq!(updated.floorplans.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn failed_association_sync_rolls_back_the_update(pool: PgPool) {
        let db = DBClient::new(pool);
        let floorplan_ids = seed_floorplans(&db, &["Ashby"]).await;

        let dto: FacadeDto = serde_json::from_value(json!({
            "title": "F1",
            "floorplan_ids": floorplan_ids,
            "variants": [{ "name": "Dark" }],
        }))
        .unwrap();
        let created = db.create_facade(dto).await.unwrap();

        let dto: FacadeDto = serde_json::from_value(json!({
            "title": "Renamed",
            "floorplan_ids": [Uuid::new_v4()],
            "variants": [],
        }))
        .unwrap();
        assert!(db.update_facade(created.facade.id, dto).await.is_err());

        let fetched = db.get_facade(created.facade.id).await.unwrap().unwrap();
        assert_eq!(fetched.facade.title, "F1");
        assert_eq!(fetched.floorplans.len(), 1);
        assert_eq!(fetched.variants.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn floorplan_filter_counts_each_facade_once(pool: PgPool) {
        let db = DBClient::new(pool);
        let floorplan_ids = seed_floorplans(&db, &["Ashby", "Brighton"]).await;

        for (title, links) in [("Hampton", floorplan_ids.clone()), ("Coastal", vec![])] {
            let dto: FacadeDto =
                serde_json::from_value(json!({ "title": title, "floorplan_ids": links })).unwrap();
            db.create_facade(dto).await.unwrap();
        }

        let filters = FacadeFilters {
            floorplan_id: Some(floorplan_ids[0]),
            ..Default::default()
        };
        let (facades, total) = db.get_facades(&filters, Pagination::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(facades[0].facade.title, "Hampton");

        let (_, total) = db
            .get_facades(&FacadeFilters::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
    }
}
