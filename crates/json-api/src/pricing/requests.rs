//! Calculate Pricing Request

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use tally::{cart::CartLine, catalog::VariantId};
use tally_app::domain::pricing::data::PricingRequest;

/// One requested cart line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculateItem {
    /// Variant to price.
    pub variant_id: i64,

    /// Requested quantity; omitted means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// Calculate Pricing Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculateRequest {
    /// Cart lines, at least one.
    pub items: Vec<CalculateItem>,

    /// Coupon code to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_code: Option<String>,

    /// Branch the order would be placed against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,

    /// Delivery address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,

    /// Requesting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldError {
    /// Path of the offending field.
    pub field: String,

    /// Human-readable constraint description.
    pub message: String,
}

/// Validate a request before it reaches the service.
///
/// Collects every violation rather than stopping at the first, so the client can
/// correct the whole payload in one round trip.
///
/// # Errors
///
/// The full list of field violations.
pub(crate) fn validate(request: &CalculateRequest) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if request.items.is_empty() {
        errors.push(FieldError {
            field: "items".to_string(),
            message: "must contain at least one item".to_string(),
        });
    }

    for (idx, item) in request.items.iter().enumerate() {
        if item.variant_id <= 0 {
            errors.push(FieldError {
                field: format!("items[{idx}].variantId"),
                message: "must be a positive integer".to_string(),
            });
        }
    }

    if let Some(code) = &request.promotion_code {
        if code.trim().is_empty() {
            errors.push(FieldError {
                field: "promotionCode".to_string(),
                message: "must not be blank".to_string(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

impl From<CalculateRequest> for PricingRequest {
    fn from(request: CalculateRequest) -> Self {
        PricingRequest {
            items: request
                .items
                .into_iter()
                .map(|item| CartLine {
                    variant_id: VariantId::new(item.variant_id),
                    quantity: item.quantity,
                })
                .collect(),
            promotion_code: request.promotion_code,
            branch_id: request.branch_id,
            address_id: request.address_id,
            user_id: request.user_id,
        }
    }
}
