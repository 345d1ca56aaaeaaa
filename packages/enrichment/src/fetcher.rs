//! Artifact fetcher: turns a provider payload into a stored artifact.

use std::time::Duration;

use reqwest::Client;

use crate::error::{EnrichError, Result};
use crate::traits::store::ContentStore;
use crate::types::generation::ImagePayload;
use crate::types::item::ArtifactRef;

/// Materializes provider payloads into the media store.
///
/// Remote URLs are downloaded with a bounded timeout; inline bytes skip
/// the download. Either way the bytes are buffered in memory and handed
/// to the store in one call, so a failure on this path leaves no partial
/// artifact behind. Download and storage failures both surface as
/// [`EnrichError::Fetch`].
pub struct ArtifactFetcher {
    client: Client,
    timeout: Duration,
}

impl ArtifactFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Materialize a payload as a stored artifact for the given item.
    pub async fn materialize(
        &self,
        store: &dyn ContentStore,
        item_id: u64,
        payload: ImagePayload,
    ) -> Result<ArtifactRef> {
        let (bytes, content_type) = match payload {
            ImagePayload::Inline {
                bytes,
                content_type,
            } => (bytes, content_type),
            ImagePayload::Remote(url) => self.download(&url).await?,
        };

        tracing::debug!(item_id, size = bytes.len(), %content_type, "storing artifact");

        store
            .store_media(item_id, bytes, &content_type)
            .await
            .map_err(|e| EnrichError::Fetch {
                message: format!("storing artifact failed: {e}"),
            })
    }

    async fn download(&self, url: &str) -> Result<(Vec<u8>, String)> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| EnrichError::Fetch {
                message: format!("download failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(EnrichError::Fetch {
                message: format!("download of {url} returned {}", response.status()),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response.bytes().await.map_err(|e| EnrichError::Fetch {
            message: format!("download body failed: {e}"),
        })?;

        Ok((bytes.to_vec(), content_type))
    }
}
