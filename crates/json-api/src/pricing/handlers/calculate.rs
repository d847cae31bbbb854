//! Calculate Pricing Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    pricing::{
        errors::{into_status_error, into_validation_error},
        requests::{self, CalculateRequest},
        responses::PricingSummaryResponse,
    },
    state::State,
};

/// Calculate Pricing Handler
///
/// Prices a cart against the active promotion catalog. Pure calculation: nothing
/// is reserved, decremented, or persisted.
#[endpoint(
    tags("pricing"),
    summary = "Calculate cart pricing",
    responses(
        (status_code = StatusCode::OK, description = "Pricing summary"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid cart, variant ids, or coupon code"),
        (status_code = StatusCode::CONFLICT, description = "Coupon conflicts with an active combo"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CalculateRequest>,
    depot: &mut Depot,
) -> Result<Json<PricingSummaryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let request = json.into_inner();

    requests::validate(&request).map_err(into_validation_error)?;

    let summary = state
        .app
        .pricing
        .calculate(request.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
