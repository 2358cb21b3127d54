//! Firestore connector errors.

use core_catalog::CatalogError;
use thiserror::Error;

/// Errors from the Firestore REST connector.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Store answered with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Malformed document payload: {0}")]
    Payload(String),
}

impl From<FirestoreError> for CatalogError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::Http(_) | FirestoreError::Status { .. } => {
                CatalogError::Fetch(err.to_string())
            }
            FirestoreError::Payload(message) => CatalogError::InvalidPayload(message),
        }
    }
}

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, FirestoreError>;
