//! The contract every role must satisfy to be orchestrated, and the
//! explicitly owned registry the runner resolves roles through.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use interview_core::{AgentMessage, AgentResponse, AgentRole, InterviewContext, MessageKind};

use crate::error::{OrchestratorError, Result};

/// A capability behind a role tag.
///
/// `act` produces the next question/step for the current phase; `evaluate`
/// judges the most recent entry in the context's answer log. The
/// orchestrator only reads the returned content, confidence, and metadata;
/// how they were produced is the provider's business.
#[async_trait]
pub trait Capability: Send + Sync {
    fn role(&self) -> AgentRole;

    async fn act(&self, ctx: &mut InterviewContext) -> Result<AgentResponse>;

    async fn evaluate(&self, ctx: &mut InterviewContext) -> Result<AgentResponse>;
}

/// Wrap a capability response in a bus message. The response metadata
/// becomes the message payload.
pub fn build_message(role: AgentRole, kind: MessageKind, response: AgentResponse) -> AgentMessage {
    AgentMessage::new(role, kind, response.content)
        .with_payload(response.metadata)
        .with_confidence(response.confidence)
}

/// Role → capability map, owned by the runner. The orchestrator holds only
/// the [`Capability`] interface, never a concrete provider type.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentRole, Arc<dyn Capability>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register a capability under its own role tag, replacing any previous
    /// registration for that role.
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.agents.insert(capability.role(), capability);
    }

    pub fn get(&self, role: AgentRole) -> Result<Arc<dyn Capability>> {
        self.agents
            .get(&role)
            .cloned()
            .ok_or(OrchestratorError::RoleNotRegistered(role))
    }

    pub fn roles(&self) -> Vec<AgentRole> {
        self.agents.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
