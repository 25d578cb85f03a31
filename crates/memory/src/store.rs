use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use interview_core::MemoryEntry;

use crate::embedder::{cosine, Embedder, HashEmbedder};
use crate::interface::{MemoryStore, Result, SearchHit};

struct StoredEntry {
    entry: MemoryEntry,
    embedding: Vec<f32>,
}

/// In-process similarity store: entries live in insertion order behind a
/// read/write lock and searches rank by cosine similarity.
pub struct SimilarityStore {
    entries: RwLock<Vec<StoredEntry>>,
    embedder: Arc<dyn Embedder>,
}

impl SimilarityStore {
    pub fn new() -> Self {
        Self::with_embedder(Arc::new(HashEmbedder::new()))
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            embedder,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn session_id_from(metadata: &Map<String, Value>) -> Option<Uuid> {
        metadata
            .get("session_id")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}

impl Default for SimilarityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for SimilarityStore {
    async fn add(&self, content: &str, metadata: Map<String, Value>) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let entry = MemoryEntry {
            id,
            session_id: Self::session_id_from(&metadata),
            content: content.to_string(),
            metadata,
            timestamp: Utc::now(),
        };
        let embedding = self.embedder.embed(content);

        self.entries
            .write()
            .await
            .push(StoredEntry { entry, embedding });

        Ok(id)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embedder.embed(query);
        let entries = self.entries.read().await;

        let mut hits: Vec<SearchHit> = entries
            .iter()
            .map(|stored| SearchHit {
                entry: stored.entry.clone(),
                score: cosine(&query_embedding, &stored.embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MemoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|stored| stored.entry.id == id)
            .map(|stored| stored.entry.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|stored| stored.entry.id != id);
        Ok(entries.len() < before)
    }

    async fn get_session_history(
        &self,
        session_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>> {
        let entries = self.entries.read().await;
        let matching: Vec<MemoryEntry> = entries
            .iter()
            .filter(|stored| stored.entry.session_id == Some(session_id))
            .map(|stored| stored.entry.clone())
            .collect();

        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn count_sessions_for_subject(&self, name: &str) -> Result<usize> {
        let entries = self.entries.read().await;
        let sessions: HashSet<Uuid> = entries
            .iter()
            .filter(|stored| {
                stored
                    .entry
                    .metadata
                    .get("candidate")
                    .and_then(Value::as_str)
                    == Some(name)
            })
            .filter_map(|stored| stored.entry.session_id)
            .collect();
        Ok(sessions.len())
    }
}
