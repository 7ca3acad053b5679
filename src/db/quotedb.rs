use async_trait::async_trait;
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::{db::DBClient, models::quotemodel::SharedQuote};

/// Catalog price of one selected item.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct PricedItem {
    pub id: Uuid,
    pub price: Option<f64>,
}

/// A priced quote ready to store.
#[derive(Debug, Clone)]
pub struct NewSharedQuote {
    pub facade_id: Option<Uuid>,
    pub floorplan_id: Option<Uuid>,
    pub variant_ids: Vec<Uuid>,
    pub upgrade_ids: Vec<Uuid>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub total_price: f64,
}

#[async_trait]
pub trait SharedQuoteExt: Send + Sync {
    async fn facade_exists(&self, facade_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn floorplan_price(&self, floorplan_id: Uuid) -> Result<Option<PricedItem>, sqlx::Error>;

    /// Only variants that belong to `facade_id`.
    async fn variant_prices(
        &self,
        facade_id: Uuid,
        variant_ids: &[Uuid],
    ) -> Result<Vec<PricedItem>, sqlx::Error>;

    /// Only active upgrades.
    async fn upgrade_prices(&self, upgrade_ids: &[Uuid]) -> Result<Vec<PricedItem>, sqlx::Error>;

    async fn create_shared_quote(&self, quote: NewSharedQuote) -> Result<SharedQuote, sqlx::Error>;

    async fn get_shared_quote(&self, quote_id: Uuid) -> Result<Option<SharedQuote>, sqlx::Error>;
}

#[async_trait]
impl SharedQuoteExt for DBClient {
    async fn facade_exists(&self, facade_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM facades WHERE id = $1)")
            .bind(facade_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn floorplan_price(&self, floorplan_id: Uuid) -> Result<Option<PricedItem>, sqlx::Error> {
        sqlx::query_as::<_, PricedItem>("SELECT id, price FROM floorplans WHERE id = $1")
            .bind(floorplan_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn variant_prices(
        &self,
        facade_id: Uuid,
        variant_ids: &[Uuid],
    ) -> Result<Vec<PricedItem>, sqlx::Error> {
        if variant_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PricedItem>(
            "SELECT id, price FROM facade_variants WHERE facade_id = $1 AND id = ANY($2)",
        )
        .bind(facade_id)
        .bind(variant_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn upgrade_prices(&self, upgrade_ids: &[Uuid]) -> Result<Vec<PricedItem>, sqlx::Error> {
        if upgrade_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, PricedItem>(
            "SELECT id, price FROM upgrades WHERE is_active = TRUE AND id = ANY($1)",
        )
        .bind(upgrade_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_shared_quote(&self, quote: NewSharedQuote) -> Result<SharedQuote, sqlx::Error> {
        sqlx::query_as::<_, SharedQuote>(
            r#"
            INSERT INTO shared_quotes (
                facade_id, floorplan_id, variant_ids, upgrade_ids,
                customer_name, customer_email, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(quote.facade_id)
        .bind(quote.floorplan_id)
        .bind(Json(quote.variant_ids))
        .bind(Json(quote.upgrade_ids))
        .bind(quote.customer_name)
        .bind(quote.customer_email)
        .bind(quote.total_price)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_shared_quote(&self, quote_id: Uuid) -> Result<Option<SharedQuote>, sqlx::Error> {
        sqlx::query_as::<_, SharedQuote>("SELECT * FROM shared_quotes WHERE id = $1")
            .bind(quote_id)
            .fetch_optional(&self.pool)
            .await
    }
}
