//! Catalog reader trait.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use tally::catalog::{Promotion, ResolvedVariant, VariantId};

use crate::domain::catalog::CatalogError;

/// Read-only access to variants and promotions.
///
/// Callers must treat any requested id missing from a returned set as
/// unresolved; the port itself never errors on unknown ids.
#[automock]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Batch-load variants together with their owning products.
    async fn find_variants_by_ids(
        &self,
        ids: Vec<VariantId>,
    ) -> Result<Vec<ResolvedVariant>, CatalogError>;

    /// Load all promotions whose validity window contains `now`, with their
    /// conditions, regardless of whether a given cart can satisfy them.
    async fn find_active_promotions(&self, now: Timestamp)
    -> Result<Vec<Promotion>, CatalogError>;

    /// Look up a promotion by coupon code, with its conditions.
    async fn find_promotion_by_code(&self, code: &str) -> Result<Option<Promotion>, CatalogError>;
}
