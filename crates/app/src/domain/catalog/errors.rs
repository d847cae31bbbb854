//! Catalog port errors.

use thiserror::Error;

/// Failure of a catalog read.
///
/// Transient-I/O retry policy belongs to the port implementation; by the time an
/// error surfaces here the read is considered failed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The underlying store could not serve the read.
    #[error("catalog read failed")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}
