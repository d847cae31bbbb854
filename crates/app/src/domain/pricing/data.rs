//! Pricing request model.

use tally::{cart::CartLine, summary::RequestContext};

/// A validated calculation request.
///
/// The HTTP layer validates shape and coercion before building this; the
/// service and engine assume strongly-typed input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingRequest {
    /// Raw cart lines, possibly with duplicate variants.
    pub items: Vec<CartLine>,

    /// Coupon code, if the shopper supplied one.
    pub promotion_code: Option<String>,

    /// Branch the order would be placed against.
    pub branch_id: Option<i64>,

    /// Delivery address.
    pub address_id: Option<i64>,

    /// Requesting user.
    pub user_id: Option<i64>,
}

impl PricingRequest {
    /// The identifiers echoed back in the summary.
    #[must_use]
    pub fn context(&self) -> RequestContext {
        RequestContext {
            promotion_code: self.promotion_code.clone(),
            branch_id: self.branch_id,
            address_id: self.address_id,
            user_id: self.user_id,
        }
    }
}
