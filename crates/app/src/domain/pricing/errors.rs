//! Pricing service errors.

use thiserror::Error;

use tally::evaluate::CalculationError;

use crate::domain::catalog::CatalogError;

/// Why a calculation request failed.
#[derive(Debug, Error)]
pub enum PricingServiceError {
    /// The request was invalid: empty cart, unresolved variant ids, or a coupon
    /// code that matches no active coupon.
    #[error("invalid pricing input: {0}")]
    InvalidInput(#[source] CalculationError),

    /// A coupon target product also participates in an active combo.
    #[error("promotion conflict: {0}")]
    Conflict(#[source] CalculationError),

    /// A catalog read failed.
    #[error("catalog read failed")]
    Catalog(#[from] CatalogError),
}

impl From<CalculationError> for PricingServiceError {
    fn from(error: CalculationError) -> Self {
        match error {
            CalculationError::CouponComboOverlap { .. } => Self::Conflict(error),
            CalculationError::EmptyCart
            | CalculationError::UnknownVariants(_)
            | CalculationError::CouponNotFound(_) => Self::InvalidInput(error),
        }
    }
}
