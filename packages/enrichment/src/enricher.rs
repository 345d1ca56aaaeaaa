//! The enrichment orchestrator.
//!
//! Coordinates provider selection, prompt construction, artifact
//! materialization, and status bookkeeping for single items and batches.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{EnrichError, Result};
use crate::fetcher::ArtifactFetcher;
use crate::prompts::{build_image_prompt, build_tag_prompt};
use crate::providers::ProviderRegistry;
use crate::tags::extract_tags;
use crate::traits::{Completion, ContentStore};
use crate::types::config::EnrichConfig;
use crate::types::generation::{
    BatchEntry, EnrichmentStats, GenerateOptions, GenerationOutcome, GenerationResult,
};
use crate::types::item::{ArtifactKind, EnrichmentStatus};

/// Orchestrator for media and tag enrichment.
///
/// Holds the provider dispatch table and injected configuration; the
/// content store and completion endpoint are the only collaborators it
/// mutates through.
pub struct Enricher<S: ContentStore, L: Completion> {
    store: S,
    llm: L,
    registry: ProviderRegistry,
    fetcher: ArtifactFetcher,
    config: EnrichConfig,
    // Serializes concurrent calls for the same (item, kind) pair so a
    // stale pending write can never clobber a generated terminal state.
    locks: Mutex<HashMap<(u64, ArtifactKind), Arc<Mutex<()>>>>,
}

impl<S: ContentStore, L: Completion> Enricher<S, L> {
    /// Create an enricher with the standard provider registry.
    pub fn new(store: S, llm: L, config: EnrichConfig) -> Self {
        let registry = ProviderRegistry::from_config(&config);
        Self::with_registry(store, llm, config, registry)
    }

    /// Create an enricher with a custom provider registry (tests swap in
    /// mock providers here).
    pub fn with_registry(
        store: S,
        llm: L,
        config: EnrichConfig,
        registry: ProviderRegistry,
    ) -> Self {
        let fetcher = ArtifactFetcher::new(config.fetch_timeout);
        Self {
            store,
            llm,
            registry,
            fetcher,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying content store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate an artifact for one item with the named provider.
    pub async fn generate(
        &self,
        item_id: u64,
        kind: ArtifactKind,
        provider: &str,
        options: GenerateOptions,
    ) -> Result<GenerationOutcome> {
        let lock = self.key_lock(item_id, kind).await;
        let _guard = lock.lock().await;

        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or(EnrichError::NotFound { item_id })?;
        let adapter = self
            .registry
            .get(provider)
            .ok_or_else(|| EnrichError::UnknownProvider(provider.to_string()))?;

        let status = self.store.get_status(item_id, kind).await?;
        if !status.can_start(options.overwrite) {
            debug!(item_id, %kind, "already generated, skipping");
            let mut outcome = GenerationOutcome::new(item_id, kind, provider);
            outcome.artifact = item.artifact(kind).cloned();
            outcome.skipped = true;
            return Ok(outcome);
        }

        self.store
            .set_status(item_id, kind, EnrichmentStatus::Pending)
            .await?;

        let prompt = build_image_prompt(&item, kind, &self.config);
        let result = match adapter.generate(&prompt, item_id).await {
            Ok(result) => result,
            Err(e) => return Err(self.fail(item_id, kind, e).await),
        };

        let mut outcome = GenerationOutcome::new(item_id, kind, provider);
        match result {
            GenerationResult::Pending { provider, job_id } => {
                // Status stays pending; a collaborator polls the job.
                info!(item_id, %kind, %provider, %job_id, "generation queued");
                outcome.pending_job = Some(job_id);
            }
            GenerationResult::Completed(payload) => {
                let artifact = match self
                    .fetcher
                    .materialize(&self.store, item_id, payload)
                    .await
                {
                    Ok(artifact) => artifact,
                    // Provider succeeded but the fetch did not: the
                    // artifact slot stays untouched.
                    Err(e) => return Err(self.fail(item_id, kind, e).await),
                };
                let attach = match kind {
                    ArtifactKind::Featured => {
                        self.store.set_featured_artifact(item_id, &artifact).await
                    }
                    ArtifactKind::Og => self.store.set_og_artifact(item_id, &artifact).await,
                };
                if let Err(e) = attach {
                    return Err(self.fail(item_id, kind, e).await);
                }
                self.store
                    .set_status(item_id, kind, EnrichmentStatus::Generated)
                    .await?;
                info!(item_id, %kind, provider, artifact_id = artifact.id, "artifact attached");
                outcome.artifact = Some(artifact);
            }
        }
        Ok(outcome)
    }

    /// Generate the featured image for one item.
    pub async fn generate_featured(
        &self,
        item_id: u64,
        provider: &str,
    ) -> Result<GenerationOutcome> {
        self.generate(
            item_id,
            ArtifactKind::Featured,
            provider,
            GenerateOptions::default(),
        )
        .await
    }

    /// Generate the OG preview image for one item.
    pub async fn generate_og(&self, item_id: u64, provider: &str) -> Result<GenerationOutcome> {
        self.generate(
            item_id,
            ArtifactKind::Og,
            provider,
            GenerateOptions::default(),
        )
        .await
    }

    /// Generate for many items; one item's failure never aborts the rest.
    ///
    /// Output order matches input order. Items are processed sequentially
    /// so provider rate limits see one request at a time.
    pub async fn batch_generate(
        &self,
        item_ids: &[u64],
        kind: ArtifactKind,
        provider: &str,
    ) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(item_ids.len());
        for &item_id in item_ids {
            let outcome = self
                .generate(item_id, kind, provider, GenerateOptions::default())
                .await;
            if let Err(e) = &outcome {
                warn!(item_id, %kind, error = %e, "batch item failed");
            }
            entries.push(BatchEntry { item_id, outcome });
        }
        entries
    }

    /// Extract topic tags for an item and merge them into its tag set.
    ///
    /// Returns the merged set. On `Unparseable` model output the item is
    /// left unmodified.
    pub async fn analyze_tags(&self, item_id: u64) -> Result<Vec<String>> {
        let item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or(EnrichError::NotFound { item_id })?;

        let prompt = build_tag_prompt(&item, &self.config);
        let raw = self
            .llm
            .complete(&prompt, self.config.tag_max_tokens)
            .await?;
        let tags = extract_tags(&raw, self.config.max_tags)?;

        debug!(item_id, count = tags.len(), "tags extracted");
        self.store.merge_tags(item_id, tags.as_slice()).await
    }

    /// How many items still miss each artifact kind.
    pub async fn stats(&self) -> Result<EnrichmentStats> {
        Ok(EnrichmentStats {
            missing_featured: self.store.count_missing(ArtifactKind::Featured).await?,
            missing_og: self.store.count_missing(ArtifactKind::Og).await?,
        })
    }

    /// Record the failed status and hand the error back to the caller.
    async fn fail(&self, item_id: u64, kind: ArtifactKind, err: EnrichError) -> EnrichError {
        warn!(item_id, %kind, error = %err, "generation failed");
        if let Err(status_err) = self
            .store
            .set_status(item_id, kind, EnrichmentStatus::Failed)
            .await
        {
            warn!(item_id, %kind, error = %status_err, "failed to record status");
        }
        err
    }

    async fn key_lock(&self, item_id: u64, kind: ArtifactKind) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        // Entries nobody holds anymore are dead weight; without this the
        // map grows by one entry per (item, kind) pair ever touched.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry((item_id, kind))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
