//! Content store implementations.

pub mod memory;
pub mod wordpress;

pub use memory::MemoryStore;
pub use wordpress::WordPressStore;
