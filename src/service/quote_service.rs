use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{
        quotedb::{NewSharedQuote, PricedItem, SharedQuoteExt},
        unique_ids,
    },
    dtos::quotedtos::CreateSharedQuoteDto,
    models::quotemodel::{QuotePricing, SharedQuote},
    service::error::ServiceError,
};

/// Every requested id must have come back from the catalog, in request order.
fn prices_for(
    requested: &[Uuid],
    found: &[PricedItem],
    what: &str,
) -> Result<Vec<Option<f64>>, ServiceError> {
    requested
        .iter()
        .map(|id| {
            found
                .iter()
                .find(|item| item.id == *id)
                .map(|item| item.price)
                .ok_or_else(|| ServiceError::Validation(format!("Unknown or unavailable {}: {}", what, id)))
        })
        .collect()
}

#[derive(Clone)]
pub struct QuoteService {
    store: Arc<dyn SharedQuoteExt>,
}

impl QuoteService {
    pub fn new(store: Arc<dyn SharedQuoteExt>) -> Self {
        Self { store }
    }

    /// Prices the selection from the catalog. Client-side totals are ignored.
    pub async fn price(&self, dto: &CreateSharedQuoteDto) -> Result<QuotePricing, ServiceError> {
        let variant_ids = unique_ids(dto.variant_ids.iter().copied());
        let upgrade_ids = unique_ids(dto.upgrade_ids.iter().copied());

        let base_price = match dto.floorplan_id {
            Some(floorplan_id) => {
                self.store
                    .floorplan_price(floorplan_id)
                    .await?
                    .ok_or(ServiceError::NotFound("Floor plan"))?
                    .price
            }
            None => None,
        };

        let variant_prices = match dto.facade_id {
            Some(facade_id) => {
                if !self.store.facade_exists(facade_id).await? {
                    return Err(ServiceError::NotFound("Facade"));
                }
                let found = self.store.variant_prices(facade_id, &variant_ids).await?;
                prices_for(&variant_ids, &found, "variant")?
            }
            None if !variant_ids.is_empty() => {
                return Err(ServiceError::Validation(
                    "Variants can only be selected together with a facade".to_string(),
                ));
            }
            None => Vec::new(),
        };

        let found = self.store.upgrade_prices(&upgrade_ids).await?;
        let upgrade_prices = prices_for(&upgrade_ids, &found, "upgrade")?;

        Ok(QuotePricing {
            base_price,
            variant_prices,
            upgrade_prices,
        })
    }

    pub async fn create(&self, dto: CreateSharedQuoteDto) -> Result<SharedQuote, ServiceError> {
        let pricing = self.price(&dto).await?;

        let quote = self
            .store
            .create_shared_quote(NewSharedQuote {
                facade_id: dto.facade_id,
                floorplan_id: dto.floorplan_id,
                variant_ids: unique_ids(dto.variant_ids),
                upgrade_ids: unique_ids(dto.upgrade_ids),
                customer_name: dto.customer_name,
                customer_email: dto.customer_email,
                total_price: pricing.total(),
            })
            .await?;

        tracing::info!("Shared quote {} saved at {:.2}", quote.id, quote.total_price);
        Ok(quote)
    }

    pub async fn get(&self, quote_id: Uuid) -> Result<SharedQuote, ServiceError> {
        self.store
            .get_shared_quote(quote_id)
            .await?
            .ok_or(ServiceError::NotFound("Quote"))
    }
}
