use async_trait::async_trait;
use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::{facadedb::FacadeExt, floorplandb::FloorPlanExt, unique_ids, DBClient},
    dtos::listingdtos::ListingDto,
    models::listingmodel::{Collection, Listing, ListingDetail, ListingType},
    utils::pagination::Pagination,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingFilters {
    pub listing_type: Option<ListingType>,
    pub collection: Option<Collection>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Minimum bedrooms, matched against the linked floor plan.
    pub beds: Option<i32>,
}

impl ListingFilters {
    fn push_from_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" FROM listings l");

        // Inner join: listings without a floor plan cannot satisfy a bedroom filter.
        if let Some(beds) = self.beds {
            qb.push(" INNER JOIN floorplans fp ON fp.id = l.floorplan_id AND fp.bedrooms >= ");
            qb.push_bind(beds);
        }

        qb.push(" WHERE TRUE");

        if let Some(listing_type) = self.listing_type {
            qb.push(" AND l.listing_type = ");
            qb.push_bind(listing_type);
        }
        if let Some(collection) = self.collection {
            qb.push(" AND l.collection = ");
            qb.push_bind(collection);
        }
        if let Some(min_price) = self.min_price {
            qb.push(" AND l.price >= ");
            qb.push_bind(min_price);
        }
        if let Some(max_price) = self.max_price {
            qb.push(" AND l.price <= ");
            qb.push_bind(max_price);
        }
    }
}

pub fn listing_page_query(
    filters: &ListingFilters,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT l.*");
    filters.push_from_where(&mut qb);
    qb.push(" ORDER BY l.created_at DESC, l.id DESC LIMIT ");
    qb.push_bind(pagination.limit());
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());
    qb
}

/// Counts parent rows, never joined rows.
pub fn listing_count_query(filters: &ListingFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(DISTINCT l.id)");
    filters.push_from_where(&mut qb);
    qb
}

#[async_trait]
pub trait ListingExt {
    async fn get_listings(
        &self,
        filters: &ListingFilters,
        pagination: Pagination,
    ) -> Result<(Vec<ListingDetail>, i64), sqlx::Error>;

    async fn get_listing(&self, listing_id: Uuid) -> Result<Option<ListingDetail>, sqlx::Error>;

    async fn create_listing(&self, dto: ListingDto) -> Result<Listing, sqlx::Error>;

    async fn update_listing(
        &self,
        listing_id: Uuid,
        dto: ListingDto,
    ) -> Result<Option<Listing>, sqlx::Error>;

    async fn delete_listing(&self, listing_id: Uuid) -> Result<bool, sqlx::Error>;
}

impl DBClient {
    async fn attach_listing_relations(
        &self,
        listings: Vec<Listing>,
    ) -> Result<Vec<ListingDetail>, sqlx::Error> {
        let facade_ids = unique_ids(listings.iter().filter_map(|l| l.facade_id));
        let floorplan_ids = unique_ids(listings.iter().filter_map(|l| l.floorplan_id));

        let facades = self.load_facade_details(&facade_ids).await?;
        let floorplans = self.load_floorplan_details(&floorplan_ids).await?;

        Ok(listings
            .into_iter()
            .map(|listing| ListingDetail {
                facade: listing
                    .facade_id
                    .and_then(|id| facades.iter().find(|f| f.facade.id == id).cloned()),
                floorplan: listing
                    .floorplan_id
                    .and_then(|id| floorplans.iter().find(|fp| fp.floorplan.id == id).cloned()),
                listing,
            })
            .collect())
    }
}

#[async_trait]
impl ListingExt for DBClient {
    async fn get_listings(
        &self,
        filters: &ListingFilters,
        pagination: Pagination,
    ) -> Result<(Vec<ListingDetail>, i64), sqlx::Error> {
        let listings = listing_page_query(filters, pagination)
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;

        let total = listing_count_query(filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let details = self.attach_listing_relations(listings).await?;
        Ok((details, total))
    }

    async fn get_listing(&self, listing_id: Uuid) -> Result<Option<ListingDetail>, sqlx::Error> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = $1")
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await?;

        match listing {
            Some(listing) => Ok(self.attach_listing_relations(vec![listing]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_listing(&self, dto: ListingDto) -> Result<Listing, sqlx::Error> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                title, address, price, listing_type, status, description, latitude, longitude,
                collection, images, land_size, building_size, agent_name, agent_phone, agent_email,
                facade_id, floorplan_id
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17
            )
            RETURNING *
            "#,
        )
        .bind(dto.title)
        .bind(dto.address)
        .bind(dto.price)
        .bind(dto.listing_type)
        .bind(dto.status)
        .bind(dto.description)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(dto.collection)
        .bind(Json(dto.images))
        .bind(dto.land_size)
        .bind(dto.building_size)
        .bind(dto.agent_name)
        .bind(dto.agent_phone)
        .bind(dto.agent_email)
        .bind(dto.facade_id)
        .bind(dto.floorplan_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(listing)
    }

    async fn update_listing(
        &self,
        listing_id: Uuid,
        dto: ListingDto,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings SET
                title = $1, address = $2, price = $3, listing_type = $4, status = $5,
                description = $6, latitude = $7, longitude = $8, collection = $9, images = $10,
                land_size = $11, building_size = $12, agent_name = $13, agent_phone = $14,
                agent_email = $15, facade_id = $16, floorplan_id = $17, updated_at = NOW()
            WHERE id = $18
            RETURNING *
            "#,
        )
        .bind(dto.title)
        .bind(dto.address)
        .bind(dto.price)
        .bind(dto.listing_type)
        .bind(dto.status)
        .bind(dto.description)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(dto.collection)
        .bind(Json(dto.images))
        .bind(dto.land_size)
        .bind(dto.building_size)
        .bind(dto.agent_name)
        .bind(dto.agent_phone)
        .bind(dto.agent_email)
        .bind(dto.facade_id)
        .bind(dto.floorplan_id)
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    async fn delete_listing(&self, listing_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(listing_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::PgPool;

    use crate::{
        db::floorplandb::FloorPlanExt, dtos::floorplandtos::FloorPlanDto,
        utils::pagination::total_pages,
    };

    #[test]
    fn no_filters_means_no_join_and_no_conditions() {
        let qb = listing_count_query(&ListingFilters::default());
        assert_eq!(qb.sql(), "SELECT COUNT(DISTINCT l.id) FROM listings l WHERE TRUE");
    }

    #[test]
    fn beds_filter_inner_joins_the_floor_plan() {
        let filters = ListingFilters {
            beds: Some(4),
            ..Default::default()
        };
        let sql = listing_count_query(&filters).sql().to_string();
        assert!(sql.contains("INNER JOIN floorplans fp ON fp.id = l.floorplan_id AND fp.bedrooms >= $1"));
        assert!(!sql.contains("l.bedrooms"));
    }

    #[test]
    fn price_range_is_inclusive_and_binds_in_order() {
        let filters = ListingFilters {
            listing_type: Some(ListingType::HouseLand),
            collection: Some(Collection::MCollection),
            min_price: Some(400_000.0),
            max_price: Some(650_000.0),
            beds: None,
        };
        let sql = listing_count_query(&filters).sql().to_string();
        assert!(sql.ends_with(
            "WHERE TRUE AND l.listing_type = $1 AND l.collection = $2 AND l.price >= $3 AND l.price <= $4"
        ));
    }

    #[test]
    fn page_query_orders_newest_first_and_paginates() {
        let filters = ListingFilters {
            beds: Some(3),
            max_price: Some(700_000.0),
            ..Default::default()
        };
        let qb = listing_page_query(&filters, Pagination::from_raw(Some("3"), Some("5")));
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT l.* FROM listings l INNER JOIN floorplans fp"));
        assert!(sql.ends_with("ORDER BY l.created_at DESC, l.id DESC LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn count_and_page_share_the_same_filters() {
        let filters = ListingFilters {
            beds: Some(2),
            min_price: Some(1.0),
            ..Default::default()
        };
        let count_sql = listing_count_query(&filters).sql().to_string();
        let page_sql = listing_page_query(&filters, Pagination::default()).sql().to_string();
        let count_tail = count_sql.trim_start_matches("SELECT COUNT(DISTINCT l.id)");
        assert!(page_sql.contains(count_tail));
    }

    async fn seed_listing(db: &DBClient, body: serde_json::Value) -> Listing {
        let dto: ListingDto = serde_json::from_value(body).unwrap();
        db.create_listing(dto).await.unwrap()
    }

    async fn seed_floorplan(db: &DBClient, title: &str, bedrooms: i32) -> Uuid {
        let dto: FloorPlanDto =
            serde_json::from_value(json!({ "title": title, "bedrooms": bedrooms })).unwrap();
        db.create_floorplan(dto).await.unwrap().id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn beds_filter_excludes_listings_without_a_floor_plan(pool: PgPool) {
        let db = DBClient::new(pool);
        let four_bed = seed_floorplan(&db, "Ashby", 4).await;
        let two_bed = seed_floorplan(&db, "Cottage", 2).await;

        seed_listing(&db, json!({ "title": "L1", "type": "house_land", "floorplan_id": four_bed })).await;
        seed_listing(&db, json!({ "title": "L2", "type": "house_land", "floorplan_id": two_bed })).await;
        seed_listing(&db, json!({ "title": "L3", "type": "house_land" })).await;

        let filters = ListingFilters {
            beds: Some(3),
            ..Default::default()
        };
        let (listings, total) = db.get_listings(&filters, Pagination::default()).await.unwrap();
        assert_eq!(total, 1);
        let titles: Vec<_> = listings.iter().map(|l| l.listing.title.as_str()).collect();
        assert_eq!(titles, vec!["L1"]);
        assert_eq!(
            listings[0].floorplan.as_ref().map(|fp| fp.floorplan.id),
            Some(four_bed)
        );

        let (_, total) = db
            .get_listings(&ListingFilters::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(total, 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn blank_price_is_stored_as_null(pool: PgPool) {
        let db = DBClient::new(pool);
        let created = seed_listing(&db, json!({ "title": "L1", "type": "ready_built", "price": "" })).await;
        assert_eq!(created.price, None);

        seed_listing(&db, json!({ "title": "L2", "type": "ready_built", "price": "450000" })).await;

        let fetched = db.get_listing(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.listing.price, None);

        let pagination = Pagination::from_raw(Some("1"), Some("1"));
        let (page, total) = db
            .get_listings(&ListingFilters::default(), pagination)
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(total_pages(total, pagination.limit), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn price_range_bounds_are_inclusive(pool: PgPool) {
        let db = DBClient::new(pool);
        for (title, price) in [("Low", 400_000), ("Mid", 500_000), ("High", 650_000)] {
            seed_listing(&db, json!({ "title": title, "type": "house_land", "price": price })).await;
        }

        let filters = ListingFilters {
            min_price: Some(400_000.0),
            max_price: Some(500_000.0),
            ..Default::default()
        };
        let (listings, total) = db.get_listings(&filters, Pagination::default()).await.unwrap();
        assert_eq!(total, 2);
        let mut titles: Vec<_> = listings.iter().map(|l| l.listing.title.clone()).collect();
        titles.sort();
        assert_eq!(titles, vec!["Low", "Mid"]);
    }
}
