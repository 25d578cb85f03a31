//! Phase state machine: the legal workflow graph, per-phase role
//! resolution, entry hooks, and branch policies.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use interview_core::{AgentRole, InterviewContext, InterviewPhase};

use crate::error::{OrchestratorError, Result};

/// Side effect attached to entering a phase. Runs inside
/// [`InterviewStateMachine::execute_transition`] after the phase has been
/// set, and may mutate the context further.
#[async_trait]
pub trait PhaseHook: Send + Sync {
    async fn on_enter(&self, ctx: &mut InterviewContext) -> Result<()>;
}

/// Resolves a multi-successor branch from observable context state.
/// Returning `None` falls through to the first declared successor.
pub trait BranchPolicy: Send + Sync {
    fn choose(&self, ctx: &InterviewContext) -> Option<InterviewPhase>;
}

/// Branch policy for the coding phase: when the most recent message's
/// payload carries the has-code marker (stamped by the DSA interviewer's
/// evaluation), prefer the code-evaluation successor.
pub struct CodeAnswerBranch;

impl BranchPolicy for CodeAnswerBranch {
    fn choose(&self, ctx: &InterviewContext) -> Option<InterviewPhase> {
        match ctx.last_message() {
            Some(message) if message.has_code_marker() => Some(InterviewPhase::CodeEvaluation),
            _ => None,
        }
    }
}

/// Clears the active question when a question phase is entered, and counts
/// the question when entering the coding phase.
struct ResetQuestionHook;

#[async_trait]
impl PhaseHook for ResetQuestionHook {
    async fn on_enter(&self, ctx: &mut InterviewContext) -> Result<()> {
        ctx.current_question = None;
        if ctx.current_phase == InterviewPhase::Dsa {
            ctx.questions_asked += 1;
        }
        Ok(())
    }
}

/// The transition table, phase/role map, and branch policies for one
/// workflow shape.
///
/// All query operations return empty/false for unknown phases rather than
/// failing; only [`execute_transition`](Self::execute_transition) can fail.
pub struct InterviewStateMachine {
    transitions: HashMap<InterviewPhase, Vec<InterviewPhase>>,
    roles: HashMap<InterviewPhase, Vec<AgentRole>>,
    hooks: HashMap<InterviewPhase, Arc<dyn PhaseHook>>,
    branch_policies: HashMap<InterviewPhase, Arc<dyn BranchPolicy>>,
}

impl InterviewStateMachine {
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            roles: HashMap::new(),
            hooks: HashMap::new(),
            branch_policies: HashMap::new(),
        }
    }

    /// The canonical interview workflow. Successor order matters: the first
    /// successor of a branching phase is its default.
    pub fn standard() -> Self {
        use InterviewPhase as P;

        let mut sm = Self::new();

        sm.add_transition(P::Init, P::ResumeAnalysis);
        sm.add_transition(P::ResumeAnalysis, P::SkillProfiling);
        sm.add_transition(P::SkillProfiling, P::Dsa);
        sm.add_transition(P::Dsa, P::SystemDesign);
        sm.add_transition(P::Dsa, P::CodeEvaluation);
        sm.add_transition(P::CodeEvaluation, P::SystemDesign);
        sm.add_transition(P::SystemDesign, P::Behavioral);
        sm.add_transition(P::SystemDesign, P::CrossAgentDebate);
        sm.add_transition(P::Behavioral, P::CrossAgentDebate);
        sm.add_transition(P::CrossAgentDebate, P::FinalDecision);
        sm.add_transition(P::FinalDecision, P::ReportGeneration);
        sm.add_transition(P::ReportGeneration, P::Completed);

        sm.set_roles(P::ResumeAnalysis, vec![AgentRole::Recruiter]);
        sm.set_roles(P::SkillProfiling, vec![AgentRole::Recruiter]);
        sm.set_roles(P::Dsa, vec![AgentRole::DsaInterviewer]);
        sm.set_roles(
            P::CodeEvaluation,
            vec![AgentRole::DsaInterviewer, AgentRole::CodeEvaluator],
        );
        sm.set_roles(P::SystemDesign, vec![AgentRole::SystemDesign]);
        sm.set_roles(P::Behavioral, vec![AgentRole::Behavioral]);
        sm.set_roles(
            P::CrossAgentDebate,
            vec![AgentRole::Critic, AgentRole::FactChecker],
        );
        sm.set_roles(P::FinalDecision, vec![AgentRole::FinalDecision]);

        sm.on_enter(P::Dsa, Arc::new(ResetQuestionHook));
        sm.on_enter(P::SystemDesign, Arc::new(ResetQuestionHook));
        sm.on_enter(P::Behavioral, Arc::new(ResetQuestionHook));
        sm.set_branch_policy(P::Dsa, Arc::new(CodeAnswerBranch));

        sm
    }

    pub fn add_transition(&mut self, from: InterviewPhase, to: InterviewPhase) {
        let successors = self.transitions.entry(from).or_default();
        if !successors.contains(&to) {
            successors.push(to);
        }
    }

    /// Ordered sequence of roles expected to act while `phase` is current.
    pub fn set_roles(&mut self, phase: InterviewPhase, roles: Vec<AgentRole>) {
        self.roles.insert(phase, roles);
    }

    pub fn on_enter(&mut self, phase: InterviewPhase, hook: Arc<dyn PhaseHook>) {
        self.hooks.insert(phase, hook);
    }

    pub fn set_branch_policy(&mut self, phase: InterviewPhase, policy: Arc<dyn BranchPolicy>) {
        self.branch_policies.insert(phase, policy);
    }

    /// True iff `to` is a declared successor of `from`. Unknown phases are
    /// not an error; they simply have no successors.
    pub fn can_transition(&self, from: InterviewPhase, to: InterviewPhase) -> bool {
        self.transitions
            .get(&from)
            .is_some_and(|successors| successors.contains(&to))
    }

    pub fn next_states(&self, from: InterviewPhase) -> &[InterviewPhase] {
        self.transitions
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn active_roles(&self, phase: InterviewPhase) -> &[AgentRole] {
        self.roles.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True iff every consecutive pair in `sequence` is a legal transition.
    /// Empty and single-element sequences are trivially valid.
    pub fn validate_flow(&self, sequence: &[InterviewPhase]) -> bool {
        sequence
            .windows(2)
            .all(|pair| self.can_transition(pair[0], pair[1]))
    }

    /// Move the context into `target`, then run the phase-entry hook if one
    /// is registered. Fails without touching the context when the
    /// transition is not legal; callers must validate-then-act, so no
    /// rollback is ever needed.
    pub async fn execute_transition(
        &self,
        ctx: &mut InterviewContext,
        target: InterviewPhase,
    ) -> Result<()> {
        if !self.can_transition(ctx.current_phase, target) {
            return Err(OrchestratorError::InvalidTransition {
                from: ctx.current_phase,
                to: target,
            });
        }

        tracing::debug!(
            session_id = %ctx.id,
            from = %ctx.current_phase,
            to = %target,
            "Phase transition"
        );
        ctx.current_phase = target;

        if let Some(hook) = self.hooks.get(&target) {
            hook.on_enter(ctx).await?;
        }
        Ok(())
    }

    /// Resolve the successor of the context's current phase. With a single
    /// successor the answer is direct; with branches the registered policy
    /// is consulted first, falling back to the first declared successor.
    /// `None` for terminal or unknown phases.
    pub fn determine_next_state(&self, ctx: &InterviewContext) -> Option<InterviewPhase> {
        let successors = self.next_states(ctx.current_phase);
        match successors {
            [] => None,
            [only] => Some(*only),
            _ => {
                if let Some(policy) = self.branch_policies.get(&ctx.current_phase) {
                    if let Some(choice) = policy.choose(ctx) {
                        if successors.contains(&choice) {
                            return Some(choice);
                        }
                        tracing::warn!(
                            phase = %ctx.current_phase,
                            choice = %choice,
                            "Branch policy selected a phase that is not a successor; using default"
                        );
                    }
                }
                Some(successors[0])
            }
        }
    }
}

impl Default for InterviewStateMachine {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::{payload_keys, AgentMessage, MessageKind};
    use serde_json::{json, Map};

    fn context_at(phase: InterviewPhase) -> InterviewContext {
        let mut ctx = InterviewContext::new("Ada");
        ctx.current_phase = phase;
        ctx
    }

    #[test]
    fn test_declared_transitions_are_legal() {
        let sm = InterviewStateMachine::standard();
        assert!(sm.can_transition(InterviewPhase::Init, InterviewPhase::ResumeAnalysis));
        assert!(sm.can_transition(InterviewPhase::Dsa, InterviewPhase::CodeEvaluation));
        assert!(sm.can_transition(InterviewPhase::Dsa, InterviewPhase::SystemDesign));
        assert!(sm.can_transition(InterviewPhase::ReportGeneration, InterviewPhase::Completed));
    }

    #[test]
    fn test_undeclared_transitions_are_rejected() {
        let sm = InterviewStateMachine::standard();
        assert!(!sm.can_transition(InterviewPhase::Init, InterviewPhase::SkillProfiling));
        assert!(!sm.can_transition(InterviewPhase::Dsa, InterviewPhase::FinalDecision));
        // terminal phase has no outgoing edges
        assert!(!sm.can_transition(InterviewPhase::Completed, InterviewPhase::Init));
        assert!(sm.next_states(InterviewPhase::Completed).is_empty());
    }

    #[test]
    fn test_every_non_terminal_phase_has_a_successor() {
        let sm = InterviewStateMachine::standard();
        // walking default successors from Init must reach the terminal phase
        let mut phase = InterviewPhase::Init;
        let mut hops = 0;
        while !phase.is_terminal() {
            let successors = sm.next_states(phase);
            assert!(!successors.is_empty(), "{phase} has no successor");
            phase = successors[0];
            hops += 1;
            assert!(hops < 32, "workflow graph does not terminate");
        }
    }

    #[test]
    fn test_active_roles_order_is_preserved() {
        let sm = InterviewStateMachine::standard();
        assert_eq!(
            sm.active_roles(InterviewPhase::CodeEvaluation),
            &[AgentRole::DsaInterviewer, AgentRole::CodeEvaluator]
        );
        assert_eq!(
            sm.active_roles(InterviewPhase::CrossAgentDebate),
            &[AgentRole::Critic, AgentRole::FactChecker]
        );
        assert!(sm.active_roles(InterviewPhase::Completed).is_empty());
    }

    #[test]
    fn test_validate_flow() {
        let sm = InterviewStateMachine::standard();
        assert!(sm.validate_flow(&[]));
        assert!(sm.validate_flow(&[InterviewPhase::Dsa]));
        assert!(sm.validate_flow(&[
            InterviewPhase::Init,
            InterviewPhase::ResumeAnalysis,
            InterviewPhase::SkillProfiling,
            InterviewPhase::Dsa,
            InterviewPhase::CodeEvaluation,
            InterviewPhase::SystemDesign,
        ]));
        // one non-adjacent jump spoils the sequence
        assert!(!sm.validate_flow(&[
            InterviewPhase::Init,
            InterviewPhase::ResumeAnalysis,
            InterviewPhase::Dsa,
        ]));
    }

    #[tokio::test]
    async fn test_execute_transition_rejects_skipping_phases() {
        let sm = InterviewStateMachine::standard();
        let mut ctx = context_at(InterviewPhase::Init);

        let error = sm
            .execute_transition(&mut ctx, InterviewPhase::SkillProfiling)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            OrchestratorError::InvalidTransition {
                from: InterviewPhase::Init,
                to: InterviewPhase::SkillProfiling,
            }
        ));
        // the failed call must not have touched the context
        assert_eq!(ctx.current_phase, InterviewPhase::Init);
    }

    #[tokio::test]
    async fn test_execute_transition_walks_the_happy_path() {
        let sm = InterviewStateMachine::standard();
        let mut ctx = context_at(InterviewPhase::Init);

        sm.execute_transition(&mut ctx, InterviewPhase::ResumeAnalysis)
            .await
            .unwrap();
        sm.execute_transition(&mut ctx, InterviewPhase::SkillProfiling)
            .await
            .unwrap();
        sm.execute_transition(&mut ctx, InterviewPhase::Dsa)
            .await
            .unwrap();
        assert_eq!(ctx.current_phase, InterviewPhase::Dsa);
    }

    #[tokio::test]
    async fn test_entering_dsa_resets_question_and_counts() {
        let sm = InterviewStateMachine::standard();
        let mut ctx = context_at(InterviewPhase::SkillProfiling);
        ctx.current_question = Some(json!({"title": "stale"}));

        sm.execute_transition(&mut ctx, InterviewPhase::Dsa)
            .await
            .unwrap();
        assert!(ctx.current_question.is_none());
        assert_eq!(ctx.questions_asked, 1);
    }

    #[test]
    fn test_branch_prefers_code_evaluation_when_marked() {
        let sm = InterviewStateMachine::standard();
        let mut ctx = context_at(InterviewPhase::Dsa);

        let mut payload = Map::new();
        payload.insert(payload_keys::HAS_CODE.to_string(), json!(true));
        ctx.record_message(
            AgentMessage::new(AgentRole::DsaInterviewer, MessageKind::Evaluation, "eval")
                .with_payload(payload),
        );

        assert_eq!(
            sm.determine_next_state(&ctx),
            Some(InterviewPhase::CodeEvaluation)
        );
    }

    #[test]
    fn test_branch_defaults_to_system_design() {
        let sm = InterviewStateMachine::standard();
        let mut ctx = context_at(InterviewPhase::Dsa);
        ctx.record_message(AgentMessage::new(
            AgentRole::DsaInterviewer,
            MessageKind::Evaluation,
            "no code seen",
        ));

        assert_eq!(
            sm.determine_next_state(&ctx),
            Some(InterviewPhase::SystemDesign)
        );
    }

    #[test]
    fn test_single_successor_needs_no_policy() {
        let sm = InterviewStateMachine::standard();
        let ctx = context_at(InterviewPhase::CrossAgentDebate);
        assert_eq!(
            sm.determine_next_state(&ctx),
            Some(InterviewPhase::FinalDecision)
        );

        let terminal = context_at(InterviewPhase::Completed);
        assert_eq!(sm.determine_next_state(&terminal), None);
    }

    #[tokio::test]
    async fn test_custom_hook_runs_on_entry() {
        struct MarkHook;

        #[async_trait]
        impl PhaseHook for MarkHook {
            async fn on_enter(&self, ctx: &mut InterviewContext) -> Result<()> {
                ctx.set_score("hook_ran", json!(true));
                Ok(())
            }
        }

        let mut sm = InterviewStateMachine::new();
        sm.add_transition(InterviewPhase::Init, InterviewPhase::ResumeAnalysis);
        sm.on_enter(InterviewPhase::ResumeAnalysis, Arc::new(MarkHook));

        let mut ctx = context_at(InterviewPhase::Init);
        sm.execute_transition(&mut ctx, InterviewPhase::ResumeAnalysis)
            .await
            .unwrap();
        assert_eq!(ctx.score("hook_ran"), Some(&json!(true)));
    }
}
