//! In-memory catalog snapshot.

use async_trait::async_trait;
use jiff::Timestamp;

use tally::catalog::{Promotion, ResolvedVariant, VariantId};

use crate::domain::catalog::{CatalogError, CatalogReader};

/// A static catalog snapshot held in memory.
///
/// Stands in for the platform's product/promotion store in tests and local
/// runs. Lookups follow the production contract: ids missing from the snapshot
/// are simply absent from the result set, never an error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    variants: Vec<ResolvedVariant>,
    promotions: Vec<Promotion>,
}

impl InMemoryCatalog {
    /// Build a snapshot from variants and promotions.
    #[must_use]
    pub fn new(variants: Vec<ResolvedVariant>, promotions: Vec<Promotion>) -> Self {
        Self {
            variants,
            promotions,
        }
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn find_variants_by_ids(
        &self,
        ids: Vec<VariantId>,
    ) -> Result<Vec<ResolvedVariant>, CatalogError> {
        Ok(self
            .variants
            .iter()
            .filter(|variant| ids.contains(&variant.id))
            .cloned()
            .collect())
    }

    async fn find_active_promotions(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Promotion>, CatalogError> {
        Ok(self
            .promotions
            .iter()
            .filter(|promotion| promotion.is_live(now))
            .cloned()
            .collect())
    }

    async fn find_promotion_by_code(&self, code: &str) -> Result<Option<Promotion>, CatalogError> {
        Ok(self
            .promotions
            .iter()
            .find(|promotion| promotion.coupon_code() == Some(code))
            .cloned())
    }
}
