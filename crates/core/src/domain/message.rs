use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::phase::AgentRole;

/// Payload keys that form documented contracts between roles and the
/// orchestrator. The bus itself treats payloads as opaque.
pub mod payload_keys {
    /// Boolean set by the DSA interviewer's evaluation when the candidate's
    /// answer contains code. The coding-phase branch policy reads it to pick
    /// the code-evaluation successor.
    pub const HAS_CODE: &str = "has_code";
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Question,
    Answer,
    Evaluation,
    Hint,
    Feedback,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
            Self::Evaluation => "evaluation",
            Self::Hint => "hint",
            Self::Feedback => "feedback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "question" => Some(Self::Question),
            "answer" => Some(Self::Answer),
            "evaluation" => Some(Self::Evaluation),
            "hint" => Some(Self::Hint),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::error::CoreError::UnknownMessageKind(s.to_string()))
    }
}

/// One immutable record on the message bus.
///
/// `receiver = None` means broadcast. Confidence is clamped to `[0, 1]` at
/// construction; messages are never mutated after publication.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct AgentMessage {
    pub id: Uuid,
    pub sender: AgentRole,
    pub receiver: Option<AgentRole>,
    pub kind: MessageKind,
    pub content: String,
    #[cfg_attr(feature = "typescript", ts(type = "Record<string, unknown>"))]
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(sender: AgentRole, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            receiver: None,
            kind,
            content: content.into(),
            payload: Map::new(),
            confidence: 0.0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_receiver(mut self, receiver: AgentRole) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Whether the payload marks the referenced answer as containing code.
    pub fn has_code_marker(&self) -> bool {
        self.payload
            .get(payload_keys::HAS_CODE)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// What a capability returns from `act` / `evaluate`.
///
/// The orchestrator only reads `content`, `confidence`, and `metadata` to
/// build an [`AgentMessage`]; everything else about how the response was
/// produced is the capability's business.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct AgentResponse {
    pub content: String,
    pub confidence: f64,
    pub reasoning: Option<String>,
    #[cfg_attr(feature = "typescript", ts(type = "Record<string, unknown>"))]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
}

impl AgentResponse {
    pub fn new(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: None,
            metadata: Map::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_defaults_to_broadcast() {
        let msg = AgentMessage::new(AgentRole::Recruiter, MessageKind::Evaluation, "profiled");
        assert!(msg.receiver.is_none());
        assert_eq!(msg.confidence, 0.0);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let msg = AgentMessage::new(AgentRole::Critic, MessageKind::Evaluation, "too sure")
            .with_confidence(1.7);
        assert_eq!(msg.confidence, 1.0);

        let msg = msg.with_confidence(-0.2);
        assert_eq!(msg.confidence, 0.0);
    }

    #[test]
    fn test_has_code_marker() {
        let mut payload = Map::new();
        payload.insert(payload_keys::HAS_CODE.to_string(), json!(true));

        let marked = AgentMessage::new(AgentRole::DsaInterviewer, MessageKind::Evaluation, "eval")
            .with_payload(payload);
        assert!(marked.has_code_marker());

        let unmarked =
            AgentMessage::new(AgentRole::DsaInterviewer, MessageKind::Evaluation, "eval");
        assert!(!unmarked.has_code_marker());
    }

    #[test]
    fn test_message_kind_serialization() {
        assert_eq!(MessageKind::Evaluation.as_str(), "evaluation");
        assert_eq!(MessageKind::parse("hint"), Some(MessageKind::Hint));
        assert_eq!(MessageKind::parse("gossip"), None);
    }

    #[test]
    fn test_response_clamps_confidence() {
        let response = AgentResponse::new("ok", 2.0);
        assert_eq!(response.confidence, 1.0);
    }
}
