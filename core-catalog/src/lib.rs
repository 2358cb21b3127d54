//! # Core Catalog Module
//!
//! Owns the song catalog for one media session: the track data model, the
//! provider abstraction over the remote document store, and the
//! readiness-gated in-memory catalog source that every browse and prepare
//! operation synchronizes on.
//!
//! ## Overview
//!
//! The catalog is loaded asynchronously exactly once per cycle. Consumers
//! never poll: they register through [`CatalogSource::when_ready`] and are
//! either answered synchronously (the load already finished) or called back
//! when the load reaches a terminal state.

pub mod error;
pub mod provider;
pub mod source;
pub mod track;

pub use error::{CatalogError, Result};
pub use provider::CatalogProvider;
pub use source::{CatalogSource, ReadinessState};
pub use track::{SongRecord, Track};
