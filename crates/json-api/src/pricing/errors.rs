//! Errors

use salvo::http::StatusError;
use tracing::error;

use tally_app::domain::pricing::PricingServiceError;

use crate::pricing::requests::FieldError;

pub(crate) fn into_status_error(error: PricingServiceError) -> StatusError {
    match error {
        PricingServiceError::InvalidInput(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PricingServiceError::Conflict(source) => StatusError::conflict().brief(source.to_string()),
        PricingServiceError::Catalog(source) => {
            error!("failed to price cart: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn into_validation_error(errors: Vec<FieldError>) -> StatusError {
    let detail = errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ");

    StatusError::bad_request().brief(detail)
}
