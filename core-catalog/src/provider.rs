//! Catalog provider abstraction.
//!
//! Concrete connectors (e.g. the Firestore REST connector) implement this
//! trait. Providers report real errors; the absorb-to-empty policy lives in
//! [`CatalogSource::load`](crate::source::CatalogSource::load), which owns
//! the decision of how a failed fetch is presented to consumers.

use crate::error::Result;
use crate::track::Track;
use async_trait::async_trait;

/// Fetches the full track catalog from a remote store.
///
/// Implementations must not retry internally; retries, if wanted, belong to
/// the caller driving the load cycle.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch every track record the store knows about, in store order.
    async fn fetch_catalog(&self) -> Result<Vec<Track>>;
}
