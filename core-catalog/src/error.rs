//! Error types for catalog operations.

use thiserror::Error;

/// Errors that can occur while fetching or serving the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The remote store could not be reached or answered with an error.
    #[error("Catalog fetch failed: {0}")]
    Fetch(String),

    /// The remote payload could not be decoded into song records.
    #[error("Catalog payload invalid: {0}")]
    InvalidPayload(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Returns `true` if this error is transient and the fetch can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Fetch(_))
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
