//! # Firestore Catalog Provider
//!
//! Implements [`CatalogProvider`](core_catalog::CatalogProvider) over the
//! Firestore REST v1 `documents:list` endpoint. The song catalog lives in a
//! single collection of flat documents; this crate fetches every page,
//! decodes the Firestore value envelope, and hands back plain tracks.
//!
//! Errors are real errors at this layer. The absorb-to-empty policy the
//! session relies on lives in `CatalogSource::load`, not here.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::FirestoreCatalogProvider;
pub use error::FirestoreError;
