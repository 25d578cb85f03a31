use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use interview_core::{AgentMessage, AgentRole, MessageKind};

/// Error type subscriber callbacks may return. Failures are logged by the
/// bus and never reach the publisher.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// A registered subscriber: invoked once per delivered message, on its own
/// task.
pub type SubscriberCallback =
    Arc<dyn Fn(AgentMessage) -> BoxFuture<'static, Result<(), CallbackError>> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("Timed out waiting for a message")]
    Timeout,

    #[error("Message bus is closed")]
    Closed,
}

/// Filter for history queries. All fields are optional; an empty filter
/// returns the full history in publish order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct HistoryFilter {
    pub sender: Option<AgentRole>,
    pub receiver: Option<AgentRole>,
    pub kind: Option<MessageKind>,
    /// Keep only the last `limit` matches. Absent means no truncation.
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(mut self, sender: AgentRole) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn receiver(mut self, receiver: AgentRole) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, message: &AgentMessage) -> bool {
        if let Some(sender) = self.sender {
            if message.sender != sender {
                return false;
            }
        }
        if let Some(receiver) = self.receiver {
            if message.receiver != Some(receiver) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if message.kind != kind {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: AgentRole, kind: MessageKind) -> AgentMessage {
        AgentMessage::new(sender, kind, "test")
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = HistoryFilter::new();
        assert!(filter.matches(&message(AgentRole::Recruiter, MessageKind::Question)));
        assert!(filter.matches(&message(AgentRole::Critic, MessageKind::Evaluation)));
    }

    #[test]
    fn test_filter_by_sender_and_kind() {
        let filter = HistoryFilter::new()
            .sender(AgentRole::Critic)
            .kind(MessageKind::Evaluation);

        assert!(filter.matches(&message(AgentRole::Critic, MessageKind::Evaluation)));
        assert!(!filter.matches(&message(AgentRole::Critic, MessageKind::Question)));
        assert!(!filter.matches(&message(AgentRole::Recruiter, MessageKind::Evaluation)));
    }

    #[test]
    fn test_receiver_filter_ignores_broadcasts() {
        let filter = HistoryFilter::new().receiver(AgentRole::Critic);

        let broadcast = message(AgentRole::Recruiter, MessageKind::Evaluation);
        assert!(!filter.matches(&broadcast));

        let targeted = broadcast.clone().with_receiver(AgentRole::Critic);
        assert!(filter.matches(&targeted));
    }
}
