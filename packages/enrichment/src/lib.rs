//! Multi-Provider Media & Tag Enrichment
//!
//! Enriches editorial content items with machine-generated images and
//! topic tags by orchestrating several independent, unreliable external
//! providers behind one uniform contract.
//!
//! # Design
//!
//! - Providers are not interchangeable in timing or payload shape
//!   (synchronous URLs, inline bytes, queued jobs); each adapter absorbs
//!   its own idiosyncrasies and normalizes to one result type.
//! - Every failure is typed ([`EnrichError`]); nothing in the pipeline
//!   panics on a misbehaving provider or malformed model output.
//! - `generated` is a terminal per-(item, kind) status: retries never
//!   silently overwrite it, only an explicit overwrite call does.
//!
//! # Usage
//!
//! ```rust,ignore
//! use enrichment::{Enricher, EnrichConfig, ArtifactKind, GenerateOptions};
//! use enrichment::stores::WordPressStore;
//! use enrichment::llm::OpenAiCompat;
//!
//! let store = WordPressStore::new("https://example.com/wp-json", "bot", app_password);
//! let llm = OpenAiCompat::new("http://172.17.0.1:1240", "local-model");
//! let enricher = Enricher::new(store, llm, EnrichConfig::default());
//!
//! let outcome = enricher
//!     .generate(post_id, ArtifactKind::Featured, "openclaw", GenerateOptions::default())
//!     .await?;
//! let tags = enricher.analyze_tags(post_id).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core seams ([`ImageProvider`], [`ContentStore`], [`Completion`])
//! - [`types`] - Items, results, outcomes, configuration
//! - [`providers`] - The four adapters and the dispatch registry
//! - [`stores`] - Content store implementations (memory, WordPress REST)
//! - [`llm`] - OpenAI-compatible completion client
//! - [`tags`] - Tag extraction from free-form model output
//! - [`testing`] - Mock implementations for tests

pub mod enricher;
pub mod error;
pub mod fetcher;
pub mod llm;
pub mod prompts;
pub mod providers;
pub mod security;
pub mod stores;
pub mod tags;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use enricher::Enricher;
pub use error::{EnrichError, Result};
pub use fetcher::ArtifactFetcher;
pub use providers::ProviderRegistry;
pub use security::SecretString;
pub use tags::{extract_tags, TagSet};
pub use traits::{Completion, ContentStore, ImageProvider};
pub use types::{
    ArtifactKind, ArtifactRef, BatchEntry, ContentItem, EnrichConfig, EnrichmentStats,
    EnrichmentStatus, GenerateOptions, GenerationOutcome, GenerationResult, ImagePayload,
};
