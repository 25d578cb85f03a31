//! Retrieval-augmented memory for Interview Studio.
//!
//! The orchestrator only depends on the [`MemoryStore`] contract; the
//! bundled [`SimilarityStore`] is an in-process implementation that ranks by
//! cosine similarity over pluggable embeddings, so the rest of the system is
//! exercisable without an external vector database.

mod embedder;
mod interface;
mod store;

pub use embedder::{Embedder, HashEmbedder};
pub use interface::{MemoryError, MemoryStore, Result, SearchHit};
pub use store::SimilarityStore;
