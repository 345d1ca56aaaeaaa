//! Generation requests, provider results, and caller-facing outcomes.

use serde::{Deserialize, Serialize};

use crate::error::EnrichError;
use crate::types::item::{ArtifactKind, ArtifactRef};

/// What a provider hands back for a successful image call.
///
/// Providers disagree on payload shape: some return a URL to download,
/// some return the bytes inline. Both collapse into one type here so the
/// fetcher is the only place that cares about the difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    /// Remote URL that must be downloaded before storage.
    Remote(String),
    /// Image bytes delivered inline in the provider response.
    Inline {
        bytes: Vec<u8>,
        content_type: String,
    },
}

/// Normalized result of a provider adapter call.
///
/// Failures are the `Err` arm of `Result<GenerationResult, EnrichError>`,
/// so every call site handles completed, pending, and failed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// The provider produced an image synchronously.
    Completed(ImagePayload),
    /// The provider accepted the job but will finish it asynchronously.
    /// The job id is surfaced so a collaborator can poll or discard it.
    Pending { provider: String, job_id: String },
}

/// Options for a single generation call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Regenerate even when the (item, kind) pair is already `generated`.
    /// Without this, the terminal state is left untouched.
    pub overwrite: bool,
}

impl GenerateOptions {
    pub fn overwrite() -> Self {
        Self { overwrite: true }
    }
}

/// Caller-facing record of one generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub item_id: u64,
    pub kind: ArtifactKind,
    pub provider: String,
    /// Stored artifact, present when the call completed (or when a
    /// terminal `generated` pair was skipped and the prior artifact kept).
    pub artifact: Option<ArtifactRef>,
    /// External job id, present when the provider queued the work.
    pub pending_job: Option<String>,
    /// True when the pair was already `generated` and no overwrite was
    /// requested; nothing was regenerated.
    pub skipped: bool,
}

impl GenerationOutcome {
    pub(crate) fn new(item_id: u64, kind: ArtifactKind, provider: &str) -> Self {
        Self {
            item_id,
            kind,
            provider: provider.to_string(),
            artifact: None,
            pending_job: None,
            skipped: false,
        }
    }
}

/// One row of a batch result; order matches the input id order.
#[derive(Debug)]
pub struct BatchEntry {
    pub item_id: u64,
    pub outcome: Result<GenerationOutcome, EnrichError>,
}

/// Read-only aggregate: how many items still miss each artifact kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub missing_featured: usize,
    pub missing_og: usize,
}
