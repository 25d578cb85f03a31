use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::message::AgentMessage;
use super::phase::{Difficulty, InterviewPhase};

pub const DEFAULT_TOTAL_QUESTIONS: u32 = 3;

/// The aggregate state of one interview run.
///
/// `current_phase` only ever changes through the orchestrator's validated
/// transitions. The score map is add-or-overwrite: categories are never
/// removed, which the branch policies and the report builder rely on.
/// A context is mutated by at most one logical step at a time; the caller
/// (the server layer) serializes steps per session id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct InterviewContext {
    pub id: Uuid,
    pub candidate_name: String,
    pub current_phase: InterviewPhase,
    pub resume: Option<String>,
    #[cfg_attr(feature = "typescript", ts(type = "unknown"))]
    #[schema(value_type = Object)]
    pub skill_profile: Option<Value>,
    pub difficulty: Difficulty,
    #[cfg_attr(feature = "typescript", ts(type = "unknown"))]
    #[schema(value_type = Object)]
    pub interview_plan: Option<Value>,
    #[cfg_attr(feature = "typescript", ts(type = "unknown"))]
    #[schema(value_type = Object)]
    pub current_question: Option<Value>,
    pub answers: Vec<String>,
    #[cfg_attr(feature = "typescript", ts(type = "Record<string, unknown>"))]
    #[schema(value_type = Object)]
    pub scores: HashMap<String, Value>,
    pub messages: Vec<AgentMessage>,
    pub questions_asked: u32,
    pub total_questions: u32,
    pub created_at: DateTime<Utc>,
}

impl InterviewContext {
    pub fn new(candidate_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_name: candidate_name.into(),
            current_phase: InterviewPhase::Init,
            resume: None,
            skill_profile: None,
            difficulty: Difficulty::default(),
            interview_plan: None,
            current_question: None,
            answers: Vec::new(),
            scores: HashMap::new(),
            messages: Vec::new(),
            questions_asked: 0,
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            created_at: Utc::now(),
        }
    }

    pub fn with_resume(mut self, resume: impl Into<String>) -> Self {
        self.resume = Some(resume.into());
        self
    }

    /// Append a submitted answer to the ordered answer log.
    pub fn record_answer(&mut self, answer: impl Into<String>) {
        self.answers.push(answer.into());
    }

    /// Append a published message to the session's ordered message log.
    pub fn record_message(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    /// Add or overwrite a score category. Categories are never removed.
    pub fn set_score(&mut self, category: impl Into<String>, value: Value) {
        self.scores.insert(category.into(), value);
    }

    pub fn score(&self, category: &str) -> Option<&Value> {
        self.scores.get(category)
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.answers.last().map(String::as_str)
    }

    pub fn last_message(&self) -> Option<&AgentMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgentRole, MessageKind};
    use serde_json::json;

    #[test]
    fn test_context_starts_at_init() {
        let ctx = InterviewContext::new("Ada");
        assert_eq!(ctx.current_phase, InterviewPhase::Init);
        assert_eq!(ctx.candidate_name, "Ada");
        assert_eq!(ctx.difficulty, Difficulty::Medium);
        assert_eq!(ctx.total_questions, DEFAULT_TOTAL_QUESTIONS);
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_scores_are_add_or_overwrite() {
        let mut ctx = InterviewContext::new("Ada");
        ctx.set_score("dsa", json!(7.5));
        ctx.set_score("dsa", json!(6.0));
        ctx.set_score("code_quality", json!(8));

        assert_eq!(ctx.score("dsa"), Some(&json!(6.0)));
        assert_eq!(ctx.scores.len(), 2);
    }

    #[test]
    fn test_answer_and_message_logs_keep_order() {
        let mut ctx = InterviewContext::new("Ada");
        ctx.record_answer("first");
        ctx.record_answer("second");
        assert_eq!(ctx.last_answer(), Some("second"));

        ctx.record_message(AgentMessage::new(
            AgentRole::Recruiter,
            MessageKind::Evaluation,
            "profiled",
        ));
        ctx.record_message(AgentMessage::new(
            AgentRole::DsaInterviewer,
            MessageKind::Question,
            "two sum",
        ));
        assert_eq!(ctx.messages.len(), 2);
        assert_eq!(ctx.last_message().unwrap().kind, MessageKind::Question);
    }
}
