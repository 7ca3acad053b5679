use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

/// A quote-builder selection saved so it can be shared by link.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SharedQuote {
    pub id: Uuid,
    pub facade_id: Option<Uuid>,
    pub floorplan_id: Option<Uuid>,
    pub variant_ids: Json<Vec<Uuid>>,
    pub upgrade_ids: Json<Vec<Uuid>>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

/// Catalog prices for the items in a quote selection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QuotePricing {
    pub base_price: Option<f64>,
    pub variant_prices: Vec<Option<f64>>,
    pub upgrade_prices: Vec<Option<f64>>,
}

impl QuotePricing {
    /// Unpriced items count as zero.
    pub fn total(&self) -> f64 {
        self.base_price.unwrap_or(0.0)
            + self.variant_prices.iter().map(|p| p.unwrap_or(0.0)).sum::<f64>()
            + self.upgrade_prices.iter().map(|p| p.unwrap_or(0.0)).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_base_variants_and_upgrades() {
        let pricing = QuotePricing {
            base_price: Some(310_000.0),
            variant_prices: vec![Some(500.0), None],
            upgrade_prices: vec![Some(4_200.0), Some(1_300.0)],
        };
        assert_eq!(pricing.total(), 316_000.0);
    }

    #[test]
    fn empty_selection_is_free() {
        assert_eq!(QuotePricing::default().total(), 0.0);
    }
}
