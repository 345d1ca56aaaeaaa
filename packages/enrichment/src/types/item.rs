//! Content items and their enrichment state.

use serde::{Deserialize, Serialize};

/// Which artifact slot on a content item a generation call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// The item's featured image (thumbnail slot).
    Featured,
    /// The Open Graph preview image (social metadata slots).
    Og,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Featured => "featured",
            ArtifactKind::Og => "og",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "featured" => Ok(ArtifactKind::Featured),
            "og" => Ok(ArtifactKind::Og),
            other => Err(format!("unknown artifact kind: {other}")),
        }
    }
}

/// Stable reference to a stored artifact (a registered media file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Id assigned by the media store.
    pub id: u64,
    /// Public URL of the stored file.
    pub url: String,
}

/// Per (item, artifact kind) enrichment state.
///
/// Legal transitions: `Unset|Failed → Pending → Generated|Failed`.
/// `Generated` is terminal; only an explicit overwrite restarts the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    #[default]
    Unset,
    Pending,
    Generated,
    Failed,
}

impl EnrichmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentStatus::Unset => "unset",
            EnrichmentStatus::Pending => "pending",
            EnrichmentStatus::Generated => "generated",
            EnrichmentStatus::Failed => "failed",
        }
    }

    /// Whether a new generation attempt may start from this state.
    ///
    /// `Generated` refuses unless the caller asked to overwrite; a retry
    /// must never silently demote the terminal state back to pending.
    pub fn can_start(&self, overwrite: bool) -> bool {
        match self {
            EnrichmentStatus::Generated => overwrite,
            _ => true,
        }
    }
}

impl std::fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnrichmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "unset" => Ok(EnrichmentStatus::Unset),
            "pending" => Ok(EnrichmentStatus::Pending),
            "generated" => Ok(EnrichmentStatus::Generated),
            "failed" => Ok(EnrichmentStatus::Failed),
            other => Err(format!("unknown enrichment status: {other}")),
        }
    }
}

/// An editorial content item, as read from the content store.
///
/// The orchestrator only reads what it needs to build prompts and writes
/// back artifact references, tags, and status markers; everything else
/// about the item stays owned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub title: String,
    /// Body text, already stripped to plain text by the store.
    pub body: String,
    /// Editorial excerpt, if one exists; prompts prefer it over the body.
    pub excerpt: String,
    /// Current featured image, if any.
    pub featured: Option<ArtifactRef>,
    /// Current OG preview image, if any.
    pub og: Option<ArtifactRef>,
    /// Existing tag labels.
    pub tags: Vec<String>,
}

impl ContentItem {
    /// Create a bare item with the given id and title.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the body text.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the excerpt.
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = excerpt.into();
        self
    }

    /// Set the existing tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(|t| t.into()).collect();
        self
    }

    /// The artifact currently occupying the given slot.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactRef> {
        match kind {
            ArtifactKind::Featured => self.featured.as_ref(),
            ArtifactKind::Og => self.og.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_is_terminal_without_overwrite() {
        assert!(!EnrichmentStatus::Generated.can_start(false));
        assert!(EnrichmentStatus::Generated.can_start(true));
    }

    #[test]
    fn test_failed_and_unset_allow_retry() {
        assert!(EnrichmentStatus::Unset.can_start(false));
        assert!(EnrichmentStatus::Failed.can_start(false));
        assert!(EnrichmentStatus::Pending.can_start(false));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            EnrichmentStatus::Unset,
            EnrichmentStatus::Pending,
            EnrichmentStatus::Generated,
            EnrichmentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<EnrichmentStatus>(), Ok(status));
        }
        assert_eq!("".parse::<EnrichmentStatus>(), Ok(EnrichmentStatus::Unset));
    }

    #[test]
    fn test_artifact_kind_parse() {
        assert_eq!("featured".parse(), Ok(ArtifactKind::Featured));
        assert_eq!("OG".parse(), Ok(ArtifactKind::Og));
        assert!("banner".parse::<ArtifactKind>().is_err());
    }
}
