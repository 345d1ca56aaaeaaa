//! Content store trait: the external system that owns the items.
//!
//! The orchestrator never talks to the CMS directly; everything goes
//! through this seam so tests can run against [`crate::stores::MemoryStore`]
//! and production against the WordPress REST implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::item::{ArtifactKind, ArtifactRef, ContentItem, EnrichmentStatus};

/// Storage and mutation primitives for content items.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch an item by id. `Ok(None)` when it does not exist.
    async fn get_item(&self, id: u64) -> Result<Option<ContentItem>>;

    /// Register binary data as a stored artifact associated with the item
    /// (for storage accounting) and return a stable reference to it.
    async fn store_media(
        &self,
        item_id: u64,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ArtifactRef>;

    /// Attach an artifact as the item's featured image.
    async fn set_featured_artifact(&self, id: u64, artifact: &ArtifactRef) -> Result<()>;

    /// Attach an artifact as the item's OG preview image.
    async fn set_og_artifact(&self, id: u64, artifact: &ArtifactRef) -> Result<()>;

    /// Read the enrichment status marker for (item, kind).
    async fn get_status(&self, id: u64, kind: ArtifactKind) -> Result<EnrichmentStatus>;

    /// Persist the enrichment status marker for (item, kind).
    async fn set_status(&self, id: u64, kind: ArtifactKind, status: EnrichmentStatus)
        -> Result<()>;

    /// Union the given labels into the item's tag set (case-insensitive)
    /// and return the merged set.
    async fn merge_tags(&self, id: u64, tags: &[String]) -> Result<Vec<String>>;

    /// Count items missing the given artifact kind.
    async fn count_missing(&self, kind: ArtifactKind) -> Result<usize>;

    /// Ids of items missing the given artifact kind, up to `limit`.
    async fn items_missing(&self, kind: ArtifactKind, limit: usize) -> Result<Vec<u64>>;
}
