//! App Context

use std::sync::Arc;

use crate::domain::{
    catalog::CatalogReader,
    pricing::{CatalogPricingService, PricingService},
};

/// Shared service wiring handed to the HTTP layer.
#[derive(Clone)]
pub struct AppContext {
    /// The pricing calculation service.
    pub pricing: Arc<dyn PricingService>,
}

impl AppContext {
    /// Build the application context on top of a catalog read port.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            pricing: Arc::new(CatalogPricingService::new(catalog)),
        }
    }
}
