use serde::{Deserialize, Serialize};

use interview_core::{AgentMessage, AgentRole, MessageKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe { filter: Option<SubscriptionFilter> },
    Unsubscribe,
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Message { message: AgentMessage },
    Subscribed { filter: Option<SubscriptionFilter> },
    Unsubscribed,
    Pong,
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SubscriptionFilter {
    pub senders: Option<Vec<AgentRole>>,
    pub kinds: Option<Vec<MessageKind>>,
}

impl SubscriptionFilter {
    pub fn for_sender(sender: AgentRole) -> Self {
        Self {
            senders: Some(vec![sender]),
            kinds: None,
        }
    }

    pub fn matches(&self, message: &AgentMessage) -> bool {
        if let Some(senders) = &self.senders {
            if !senders.contains(&message.sender) {
                return false;
            }
        }
        if let Some(kinds) = &self.kinds {
            if !kinds.contains(&message.kind) {
                return false;
            }
        }
        true
    }
}
