//! Data types for the enrichment pipeline.

pub mod config;
pub mod generation;
pub mod item;

pub use config::{
    AsyncQueueConfig, DirectImageConfig, EnrichConfig, LocalSynthConfig, RemoteJobConfig,
};
pub use generation::{
    BatchEntry, EnrichmentStats, GenerateOptions, GenerationOutcome, GenerationResult,
    ImagePayload,
};
pub use item::{ArtifactKind, ArtifactRef, ContentItem, EnrichmentStatus};
