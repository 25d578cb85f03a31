//! Session registry: the addressing mechanism the orchestrator uses to
//! locate an interview context.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use interview_core::InterviewContext;

use crate::error::{OrchestratorError, Result};

/// One session's context behind its step-serialization lock. The
/// orchestrator itself applies no locking; holding this mutex for the
/// duration of a workflow step is how the transport layer guarantees at
/// most one logical step per session at a time.
pub type SharedContext = Arc<Mutex<InterviewContext>>;

/// Identifier → context map.
///
/// Sessions are kept for the life of the process; there is no eviction or
/// expiry policy yet, so a long-running deployment grows without bound.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SharedContext>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session at the initial phase and return its id and handle.
    pub async fn create(
        &self,
        candidate_name: impl Into<String>,
        resume: Option<String>,
    ) -> (Uuid, SharedContext) {
        let mut ctx = InterviewContext::new(candidate_name);
        if let Some(resume) = resume {
            ctx = ctx.with_resume(resume);
        }
        let id = ctx.id;
        let shared = Arc::new(Mutex::new(ctx));

        self.sessions.write().await.insert(id, Arc::clone(&shared));
        tracing::info!(session_id = %id, "Session created");
        (id, shared)
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedContext> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(OrchestratorError::SessionNotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::InterviewPhase;

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create("Ada", Some("resume text".to_string())).await;

        let shared = registry.get(id).await.unwrap();
        let ctx = shared.lock().await;
        assert_eq!(ctx.candidate_name, "Ada");
        assert_eq!(ctx.current_phase, InterviewPhase::Init);
        assert_eq!(ctx.resume.as_deref(), Some("resume text"));
    }

    #[tokio::test]
    async fn test_get_unknown_session_fails() {
        let registry = SessionRegistry::new();
        let missing = Uuid::new_v4();

        let error = registry.get(missing).await.unwrap_err();
        assert!(matches!(
            error,
            OrchestratorError::SessionNotFound(id) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_sessions_accumulate() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty().await);

        registry.create("Ada", None).await;
        registry.create("Grace", None).await;
        assert_eq!(registry.len().await, 2);
    }
}
