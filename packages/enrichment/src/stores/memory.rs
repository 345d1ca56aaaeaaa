//! In-memory content store for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{EnrichError, Result};
use crate::traits::store::ContentStore;
use crate::types::item::{ArtifactKind, ArtifactRef, ContentItem, EnrichmentStatus};

/// A media file registered with the store.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub item_id: u64,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub url: String,
}

/// In-memory implementation of [`ContentStore`].
///
/// Useful for tests and development. Not suitable for production as data
/// is lost on restart. Tracks per-slot write counts so tests can assert
/// "exactly one write" properties, and can be told to fail media storage
/// to exercise fetch-error paths.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<u64, ContentItem>>,
    statuses: RwLock<HashMap<(u64, ArtifactKind), EnrichmentStatus>>,
    media: RwLock<HashMap<u64, StoredMedia>>,
    slot_writes: RwLock<HashMap<(u64, ArtifactKind), usize>>,
    next_media_id: AtomicU64,
    fail_media: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            next_media_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    /// Insert or replace an item.
    pub fn insert_item(&self, item: ContentItem) {
        self.items.write().unwrap().insert(item.id, item);
    }

    /// Make subsequent `store_media` calls fail (for fetch-error tests).
    pub fn set_media_failure(&self, fail: bool) {
        self.fail_media.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of an item, if present.
    pub fn item(&self, id: u64) -> Option<ContentItem> {
        self.items.read().unwrap().get(&id).cloned()
    }

    /// A stored media record, if present.
    pub fn media(&self, media_id: u64) -> Option<StoredMedia> {
        self.media.read().unwrap().get(&media_id).cloned()
    }

    /// Number of media files registered.
    pub fn media_count(&self) -> usize {
        self.media.read().unwrap().len()
    }

    /// How many times the given artifact slot was written.
    pub fn slot_write_count(&self, id: u64, kind: ArtifactKind) -> usize {
        self.slot_writes
            .read()
            .unwrap()
            .get(&(id, kind))
            .copied()
            .unwrap_or(0)
    }

    fn record_slot_write(&self, id: u64, kind: ArtifactKind) {
        *self.slot_writes.write().unwrap().entry((id, kind)).or_insert(0) += 1;
    }

    fn with_item_mut<F>(&self, id: u64, f: F) -> Result<()>
    where
        F: FnOnce(&mut ContentItem),
    {
        let mut items = self.items.write().unwrap();
        let item = items
            .get_mut(&id)
            .ok_or(EnrichError::NotFound { item_id: id })?;
        f(item);
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_item(&self, id: u64) -> Result<Option<ContentItem>> {
        Ok(self.items.read().unwrap().get(&id).cloned())
    }

    async fn store_media(
        &self,
        item_id: u64,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ArtifactRef> {
        if self.fail_media.load(Ordering::SeqCst) {
            return Err(EnrichError::Store("media storage unavailable".into()));
        }
        let id = self.next_media_id.fetch_add(1, Ordering::SeqCst);
        let url = format!("memory://media/{id}");
        self.media.write().unwrap().insert(
            id,
            StoredMedia {
                item_id,
                bytes,
                content_type: content_type.to_string(),
                url: url.clone(),
            },
        );
        Ok(ArtifactRef { id, url })
    }

    async fn set_featured_artifact(&self, id: u64, artifact: &ArtifactRef) -> Result<()> {
        self.with_item_mut(id, |item| item.featured = Some(artifact.clone()))?;
        self.record_slot_write(id, ArtifactKind::Featured);
        Ok(())
    }

    async fn set_og_artifact(&self, id: u64, artifact: &ArtifactRef) -> Result<()> {
        self.with_item_mut(id, |item| item.og = Some(artifact.clone()))?;
        self.record_slot_write(id, ArtifactKind::Og);
        Ok(())
    }

    async fn get_status(&self, id: u64, kind: ArtifactKind) -> Result<EnrichmentStatus> {
        Ok(self
            .statuses
            .read()
            .unwrap()
            .get(&(id, kind))
            .copied()
            .unwrap_or_default())
    }

    async fn set_status(
        &self,
        id: u64,
        kind: ArtifactKind,
        status: EnrichmentStatus,
    ) -> Result<()> {
        self.statuses.write().unwrap().insert((id, kind), status);
        Ok(())
    }

    async fn merge_tags(&self, id: u64, tags: &[String]) -> Result<Vec<String>> {
        let mut merged = Vec::new();
        self.with_item_mut(id, |item| {
            let mut seen: Vec<String> =
                item.tags.iter().map(|t| t.to_lowercase()).collect();
            for tag in tags {
                let lowered = tag.to_lowercase();
                if !seen.contains(&lowered) {
                    item.tags.push(tag.clone());
                    seen.push(lowered);
                }
            }
            merged = item.tags.clone();
        })?;
        Ok(merged)
    }

    async fn count_missing(&self, kind: ArtifactKind) -> Result<usize> {
        Ok(self
            .items
            .read()
            .unwrap()
            .values()
            .filter(|item| item.artifact(kind).is_none())
            .count())
    }

    async fn items_missing(&self, kind: ArtifactKind, limit: usize) -> Result<Vec<u64>> {
        let mut ids: Vec<u64> = self
            .items
            .read()
            .unwrap()
            .values()
            .filter(|item| item.artifact(kind).is_none())
            .map(|item| item.id)
            .collect();
        ids.sort_unstable();
        ids.truncate(limit);
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_merge_tags_is_case_insensitive_union() {
        let store = MemoryStore::new();
        store.insert_item(ContentItem::new(1, "t").with_tags(["Drones", "dji"]));

        let merged = store
            .merge_tags(1, &["drones".to_string(), "review".to_string()])
            .await
            .unwrap();
        assert_eq!(merged, vec!["Drones", "dji", "review"]);
    }

    #[tokio::test]
    async fn test_missing_queries() {
        let store = MemoryStore::new();
        store.insert_item(ContentItem::new(1, "a"));
        store.insert_item(ContentItem::new(2, "b"));
        let media = store.store_media(2, vec![1, 2, 3], "image/png").await.unwrap();
        store.set_featured_artifact(2, &media).await.unwrap();

        assert_eq!(store.count_missing(ArtifactKind::Featured).await.unwrap(), 1);
        assert_eq!(store.count_missing(ArtifactKind::Og).await.unwrap(), 2);
        assert_eq!(
            store.items_missing(ArtifactKind::Featured, 10).await.unwrap(),
            vec![1]
        );
    }

    #[tokio::test]
    async fn test_status_defaults_to_unset() {
        let store = MemoryStore::new();
        assert_eq!(
            store.get_status(9, ArtifactKind::Featured).await.unwrap(),
            EnrichmentStatus::Unset
        );
    }

    #[tokio::test]
    async fn test_media_failure_toggle() {
        let store = MemoryStore::new();
        store.set_media_failure(true);
        let err = store.store_media(1, vec![0], "image/png").await.unwrap_err();
        assert!(matches!(err, EnrichError::Store(_)));
    }
}
