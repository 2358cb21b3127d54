//! Firestore REST connector.
//!
//! Lists every document of the configured song collection, following
//! `nextPageToken` cursors until the collection is exhausted.

use crate::error::{FirestoreError, Result};
use crate::types::ListDocumentsResponse;
use async_trait::async_trait;
use core_catalog::{CatalogProvider, Track};
use core_runtime::config::SessionConfig;
use std::time::Duration;
use tracing::{debug, instrument};

/// Firestore REST API base URL.
const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per page (Firestore caps pages at 300).
const PAGE_SIZE: u32 = 300;

/// Catalog provider backed by a Firestore song collection.
///
/// Reads are unauthenticated, matching a collection with public read rules;
/// auth, were it needed, would be one header away.
pub struct FirestoreCatalogProvider {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    fetch_timeout: Duration,
}

impl FirestoreCatalogProvider {
    /// Create a provider for the session's configured project/collection.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: FIRESTORE_API_BASE.to_string(),
            project_id: config.project_id.clone(),
            collection: config.song_collection.clone(),
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Point the connector at a different endpoint (tests, emulators).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, self.collection
        )
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> Result<ListDocumentsResponse> {
        let mut request = self
            .client
            .get(self.collection_url())
            .query(&[("pageSize", PAGE_SIZE.to_string())])
            .timeout(self.fetch_timeout);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FirestoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ListDocumentsResponse>()
            .await
            .map_err(|err| FirestoreError::Payload(err.to_string()))
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn fetch_all(&self) -> Result<Vec<Track>> {
        let mut tracks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(page_token.as_deref()).await?;
            debug!(documents = page.documents.len(), "fetched catalog page");
            tracks.extend(
                page.documents
                    .into_iter()
                    .map(|doc| Track::from(doc.into_song_record())),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(tracks)
    }
}

#[async_trait]
impl CatalogProvider for FirestoreCatalogProvider {
    async fn fetch_catalog(&self) -> core_catalog::Result<Vec<Track>> {
        self.fetch_all().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> FirestoreCatalogProvider {
        let config = SessionConfig::builder()
            .project_id("demo-project")
            .song_collection("songs")
            .build()
            .unwrap();
        FirestoreCatalogProvider::new(&config)
    }

    #[test]
    fn collection_url_targets_default_database() {
        assert_eq!(
            provider().collection_url(),
            "https://firestore.googleapis.com/v1/projects/demo-project/\
             databases/(default)/documents/songs"
        );
    }

    #[test]
    fn base_url_override_for_emulator() {
        let p = provider().with_base_url("http://localhost:8080/v1");
        assert!(p
            .collection_url()
            .starts_with("http://localhost:8080/v1/projects/demo-project"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_fetch_error() {
        // Nothing listens on this port; the connector reports a transport
        // error instead of absorbing it.
        let p = provider().with_base_url("http://127.0.0.1:1/v1");
        let err = p.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, core_catalog::CatalogError::Fetch(_)));
    }
}
