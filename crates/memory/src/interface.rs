use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use interview_core::MemoryEntry;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Memory backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub entry: MemoryEntry,
    pub score: f32,
}

/// Contract every memory backend must satisfy.
///
/// Metadata is opaque to the store except for two conventional keys:
/// `session_id` (stringified UUID, used for session history) and
/// `candidate` (used for per-subject session counting).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Remember `content`; returns the new entry's id.
    async fn add(&self, content: &str, metadata: Map<String, Value>) -> Result<Uuid>;

    /// Rank remembered entries against `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemoryEntry>>;

    /// Returns whether an entry was actually removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Entries remembered for one session, oldest first, truncated to the
    /// last `limit`.
    async fn get_session_history(&self, session_id: Uuid, limit: usize)
        -> Result<Vec<MemoryEntry>>;

    /// Number of distinct sessions remembered for a candidate.
    async fn count_sessions_for_subject(&self, name: &str) -> Result<usize>;
}
