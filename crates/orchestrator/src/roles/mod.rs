//! Built-in capability implementations, one per role.
//!
//! Every role follows the same shape: build a prompt from the context,
//! call the configured provider, digest the reply, and fold scores back
//! into the context. Parse failures degrade to a lower-confidence fallback
//! response; provider failures propagate and are degraded by the runner.

mod behavioral;
mod code_evaluator;
mod critic;
mod dsa_interviewer;
mod fact_checker;
mod final_decision;
mod recruiter;
mod system_design;

pub use behavioral::BehavioralRole;
pub use code_evaluator::CodeEvaluatorRole;
pub use critic::CriticRole;
pub use dsa_interviewer::DsaInterviewerRole;
pub use fact_checker::FactCheckerRole;
pub use final_decision::FinalDecisionRole;
pub use recruiter::RecruiterRole;
pub use system_design::SystemDesignRole;

use std::sync::Arc;

use interview_core::{InterviewContext, MessageKind};

use crate::capability::AgentRegistry;
use crate::services::prompts::truncate;
use crate::services::LlmClient;

/// Register all built-in roles against one shared provider client.
pub fn standard_registry(llm: &LlmClient) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(RecruiterRole::new(llm.clone())));
    registry.register(Arc::new(DsaInterviewerRole::new(llm.clone())));
    registry.register(Arc::new(CodeEvaluatorRole::new(llm.clone())));
    registry.register(Arc::new(SystemDesignRole::new(llm.clone())));
    registry.register(Arc::new(BehavioralRole::new(llm.clone())));
    registry.register(Arc::new(CriticRole::new(llm.clone())));
    registry.register(Arc::new(FactCheckerRole::new(llm.clone())));
    registry.register(Arc::new(FinalDecisionRole::new(llm.clone())));
    registry
}

/// The last `limit` evaluation messages as "sender: content" lines, oldest
/// first. The debate roles read these to ground their arguments.
pub(crate) fn recent_evaluation_lines(ctx: &InterviewContext, limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = ctx
        .messages
        .iter()
        .rev()
        .filter(|m| m.kind == MessageKind::Evaluation)
        .take(limit)
        .map(|m| format!("{}: {}", m.sender, truncate(&m.content, 300)))
        .collect();
    lines.reverse();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::{AgentMessage, AgentRole};

    #[test]
    fn test_recent_evaluation_lines_filters_and_orders() {
        let mut ctx = InterviewContext::new("Ada");
        ctx.record_message(AgentMessage::new(
            AgentRole::DsaInterviewer,
            MessageKind::Question,
            "two sum",
        ));
        ctx.record_message(AgentMessage::new(
            AgentRole::DsaInterviewer,
            MessageKind::Evaluation,
            "good approach",
        ));
        ctx.record_message(AgentMessage::new(
            AgentRole::CodeEvaluator,
            MessageKind::Evaluation,
            "clean code",
        ));

        let lines = recent_evaluation_lines(&ctx, 6);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("dsa_interviewer:"));
        assert!(lines[1].starts_with("code_evaluator:"));
    }

    #[test]
    fn test_recent_evaluation_lines_respects_limit() {
        let mut ctx = InterviewContext::new("Ada");
        for i in 0..5 {
            ctx.record_message(AgentMessage::new(
                AgentRole::Critic,
                MessageKind::Evaluation,
                format!("eval {i}"),
            ));
        }

        let lines = recent_evaluation_lines(&ctx, 2);
        assert_eq!(lines.len(), 2);
        // keeps the most recent two, in original order
        assert!(lines[0].contains("eval 3"));
        assert!(lines[1].contains("eval 4"));
    }
}
