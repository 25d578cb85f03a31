use thiserror::Error;
use uuid::Uuid;

use interview_core::{AgentRole, InterviewPhase};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition {
        from: InterviewPhase,
        to: InterviewPhase,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("No capability registered for role: {0}")]
    RoleNotRegistered(AgentRole),

    #[error("No successor defined for phase: {0}")]
    NoSuccessor(InterviewPhase),

    #[error("No active question for session: {0}")]
    NoActiveQuestion(Uuid),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Memory error: {0}")]
    Memory(#[from] memory::MemoryError),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_names_both_phases() {
        let error = OrchestratorError::InvalidTransition {
            from: InterviewPhase::Init,
            to: InterviewPhase::SkillProfiling,
        };
        let text = error.to_string();
        assert!(text.contains("init"));
        assert!(text.contains("skill_profiling"));
    }
}
