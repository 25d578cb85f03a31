//! The interview runner: one workflow step at a time.
//!
//! A step moves the context into a phase, invokes the roles active there
//! through the capability contract, and publishes each resulting message on
//! the bus. Structural errors (invalid transition, unregistered role)
//! surface to the caller; capability failures degrade into empty
//! low-confidence messages so one bad provider call never breaks the state
//! machine or the bus.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use events::MessageBus;
use interview_core::{
    AgentMessage, AgentResponse, AgentRole, InterviewContext, InterviewPhase, MessageKind,
};
use memory::MemoryStore;

use crate::capability::{build_message, AgentRegistry};
use crate::error::{OrchestratorError, Result};
use crate::report::compile_report;
use crate::state_machine::InterviewStateMachine;

/// One hint served from the active question.
#[derive(Debug, Clone)]
pub struct Hint {
    pub text: String,
    pub remaining: usize,
}

const FALLBACK_HINT: &str =
    "Try thinking about the time complexity. Can you do better than O(n^2)?";

pub struct InterviewRunner {
    bus: MessageBus,
    state_machine: InterviewStateMachine,
    agents: AgentRegistry,
    memory: Arc<dyn MemoryStore>,
}

impl InterviewRunner {
    pub fn new(
        bus: MessageBus,
        state_machine: InterviewStateMachine,
        agents: AgentRegistry,
        memory: Arc<dyn MemoryStore>,
    ) -> Self {
        Self {
            bus,
            state_machine,
            agents,
            memory,
        }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn state_machine(&self) -> &InterviewStateMachine {
        &self.state_machine
    }

    /// Execute one workflow step: transition into `target` (or the resolved
    /// successor when absent) and run the roles active in that phase.
    pub async fn advance(
        &self,
        ctx: &mut InterviewContext,
        target: Option<InterviewPhase>,
    ) -> Result<InterviewPhase> {
        let target = match target {
            Some(target) => target,
            None => self
                .state_machine
                .determine_next_state(ctx)
                .ok_or(OrchestratorError::NoSuccessor(ctx.current_phase))?,
        };

        self.state_machine.execute_transition(ctx, target).await?;
        self.run_phase_roles(ctx, target).await?;

        if target == InterviewPhase::ReportGeneration {
            self.publish_report(ctx).await;
        }

        info!(session_id = %ctx.id, phase = %target, "Workflow step completed");
        Ok(target)
    }

    /// Record a submitted answer, run the current phase's roles in
    /// evaluation mode, and follow the branch policy into an evaluation
    /// sub-phase when it selects a non-default successor.
    pub async fn submit_answer(&self, ctx: &mut InterviewContext, answer: &str) -> Result<()> {
        ctx.record_answer(answer);

        let phase = ctx.current_phase;
        let roles = self.state_machine.active_roles(phase).to_vec();
        for role in roles {
            let capability = self.agents.get(role)?;
            let response = match capability.evaluate(ctx).await {
                Ok(response) => response,
                Err(error) => degraded_response(role, &error),
            };
            self.publish_for(ctx, role, MessageKind::Evaluation, response)
                .await;
        }

        // A branch policy choosing something other than the default
        // successor signals an immediate sub-phase (code evaluation); the
        // default path waits for an explicit advance.
        let successors = self.state_machine.next_states(phase);
        if successors.len() > 1 {
            if let Some(next) = self.state_machine.determine_next_state(ctx) {
                if successors.first() != Some(&next) {
                    self.advance(ctx, Some(next)).await?;
                }
            }
        }

        Ok(())
    }

    /// Serve the next unused hint from the active question.
    pub async fn hint(&self, ctx: &mut InterviewContext) -> Result<Hint> {
        let question = ctx
            .current_question
            .clone()
            .ok_or(OrchestratorError::NoActiveQuestion(ctx.id))?;

        let hints: Vec<String> = question["hints"]
            .as_array()
            .map(|hints| {
                hints
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let used = ctx
            .score("hints_used")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;

        let hint = if used < hints.len() {
            ctx.set_score("hints_used", json!(used + 1));
            Hint {
                text: hints[used].clone(),
                remaining: hints.len() - used - 1,
            }
        } else {
            Hint {
                text: FALLBACK_HINT.to_string(),
                remaining: 0,
            }
        };

        let sender = self
            .state_machine
            .active_roles(ctx.current_phase)
            .first()
            .copied()
            .unwrap_or(AgentRole::DsaInterviewer);
        let message = AgentMessage::new(sender, MessageKind::Hint, hint.text.clone())
            .with_confidence(1.0);
        ctx.record_message(message.clone());
        self.bus.publish(message.clone());
        self.remember(ctx, &message).await;

        Ok(hint)
    }

    async fn run_phase_roles(&self, ctx: &mut InterviewContext, phase: InterviewPhase) -> Result<()> {
        let roles = self.state_machine.active_roles(phase).to_vec();
        for role in roles {
            let capability = self.agents.get(role)?;
            let invocation = if phase == InterviewPhase::CodeEvaluation {
                capability.evaluate(ctx).await
            } else {
                capability.act(ctx).await
            };
            let response = match invocation {
                Ok(response) => response,
                Err(error) => degraded_response(role, &error),
            };
            self.publish_for(ctx, role, message_kind_for(phase), response)
                .await;
        }
        Ok(())
    }

    async fn publish_for(
        &self,
        ctx: &mut InterviewContext,
        role: AgentRole,
        kind: MessageKind,
        response: AgentResponse,
    ) {
        let message = build_message(role, kind, response);
        ctx.record_message(message.clone());
        self.bus.publish(message.clone());
        self.remember(ctx, &message).await;
    }

    async fn publish_report(&self, ctx: &mut InterviewContext) {
        let report = compile_report(ctx);
        let mut metadata = Map::new();
        metadata.insert(
            "report".to_string(),
            serde_json::to_value(&report).unwrap_or_default(),
        );

        let response = AgentResponse::new(
            format!(
                "Final report for {}: {} with overall score {:.1}/10.",
                report.candidate_name, report.recommendation, report.overall_score
            ),
            1.0,
        )
        .with_metadata(metadata);

        self.publish_for(
            ctx,
            AgentRole::FinalDecision,
            MessageKind::Feedback,
            response,
        )
        .await;
    }

    async fn remember(&self, ctx: &InterviewContext, message: &AgentMessage) {
        let mut metadata = Map::new();
        metadata.insert("session_id".to_string(), json!(ctx.id.to_string()));
        metadata.insert("candidate".to_string(), json!(ctx.candidate_name));
        metadata.insert("role".to_string(), json!(message.sender.as_str()));
        metadata.insert("kind".to_string(), json!(message.kind.as_str()));

        if let Err(error) = self.memory.add(&message.content, metadata).await {
            warn!(session_id = %ctx.id, %error, "Failed to remember message");
        }
    }
}

/// A failing capability degrades that step's message instead of failing
/// the step.
fn degraded_response(role: AgentRole, error: &OrchestratorError) -> AgentResponse {
    warn!(%role, %error, "Capability failed, publishing degraded message");
    let mut metadata = Map::new();
    metadata.insert("error".to_string(), json!(error.to_string()));
    AgentResponse::new("", 0.0).with_metadata(metadata)
}

fn message_kind_for(phase: InterviewPhase) -> MessageKind {
    match phase {
        InterviewPhase::Dsa | InterviewPhase::SystemDesign | InterviewPhase::Behavioral => {
            MessageKind::Question
        }
        InterviewPhase::ResumeAnalysis
        | InterviewPhase::SkillProfiling
        | InterviewPhase::CodeEvaluation
        | InterviewPhase::CrossAgentDebate => MessageKind::Evaluation,
        InterviewPhase::Init
        | InterviewPhase::FinalDecision
        | InterviewPhase::ReportGeneration
        | InterviewPhase::Completed => MessageKind::Feedback,
    }
}
