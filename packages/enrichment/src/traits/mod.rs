//! Core trait abstractions (providers, content store, completion).

pub mod llm;
pub mod provider;
pub mod store;

pub use llm::Completion;
pub use provider::ImageProvider;
pub use store::ContentStore;
