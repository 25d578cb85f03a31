use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::time::interval;

use events::MessageBus;
use interview_core::AgentMessage;

use crate::messages::{ClientMessage, ServerMessage, SubscriptionFilter};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
const CHANNEL_CAPACITY: usize = 1000;

/// Shared WebSocket state. Construct once per process: a single bus
/// subscriber bridges into the broadcast channel, and every client
/// connection gets its own receiver with automatic cleanup on drop.
pub struct WsState {
    tx: broadcast::Sender<AgentMessage>,
}

impl WsState {
    pub fn new(bus: &MessageBus) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);

        let bridge = tx.clone();
        bus.subscribe_broadcast(move |message| {
            // No receivers just means no clients are connected.
            let _ = bridge.send(message);
            async move { Ok(()) }
        });

        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AgentMessage> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut message_rx = state.subscribe();
    let mut filter: Option<SubscriptionFilter> = None;
    let mut subscribed = false;

    let mut heartbeat = interval(HEARTBEAT_INTERVAL);
    heartbeat.reset();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let ping = serde_json::to_string(&ServerMessage::Pong).unwrap();
                if sender.send(Message::Text(ping.into())).await.is_err() {
                    break;
                }
            }

            message_result = message_rx.recv() => {
                match message_result {
                    Ok(message) => {
                        if subscribed {
                            let should_send = filter.as_ref()
                                .map(|f| f.matches(&message))
                                .unwrap_or(true);

                            if should_send {
                                let msg = ServerMessage::Message { message };
                                let json = serde_json::to_string(&msg).unwrap();
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket client lagged, missed {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }

            msg = tokio::time::timeout(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL, receiver.next()) => {
                match msg {
                    Ok(Some(Ok(Message::Text(text)))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Subscribe { filter: new_filter }) => {
                                filter = new_filter.clone();
                                subscribed = true;
                                let response = ServerMessage::Subscribed { filter: new_filter };
                                let json = serde_json::to_string(&response).unwrap();
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Ok(ClientMessage::Unsubscribe) => {
                                subscribed = false;
                                filter = None;
                                let response = ServerMessage::Unsubscribed;
                                let json = serde_json::to_string(&response).unwrap();
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Ok(ClientMessage::Ping) => {
                                let response = ServerMessage::Pong;
                                let json = serde_json::to_string(&response).unwrap();
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                let response = ServerMessage::Error {
                                    message: format!("Invalid message: {}", e),
                                };
                                let json = serde_json::to_string(&response).unwrap();
                                let _ = sender.send(Message::Text(json.into())).await;
                            }
                        }
                    }
                    Ok(Some(Ok(Message::Close(_)))) => {
                        break;
                    }
                    Ok(Some(Ok(Message::Ping(data)))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Ok(Some(Ok(_))) => {}
                    Ok(Some(Err(_))) => {
                        break;
                    }
                    Ok(None) => {
                        break;
                    }
                    Err(_) => {
                        tracing::debug!("WebSocket client timeout, sending ping");
                    }
                }
            }
        }
    }

    tracing::debug!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::{AgentRole, MessageKind};

    #[tokio::test]
    async fn test_bus_messages_reach_ws_subscribers() {
        let bus = MessageBus::new();
        let state = WsState::new(&bus);
        let mut rx = state.subscribe();

        let published = AgentMessage::new(AgentRole::Recruiter, MessageKind::Evaluation, "hi");
        let expected_id = published.id;
        bus.publish(published);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, expected_id);
    }

    #[tokio::test]
    async fn test_publish_with_no_clients_is_fine() {
        let bus = MessageBus::new();
        let state = WsState::new(&bus);
        assert_eq!(state.client_count(), 0);

        bus.publish(AgentMessage::new(
            AgentRole::Recruiter,
            MessageKind::Evaluation,
            "nobody listening",
        ));
        // a later subscriber only sees future messages
        let mut rx = state.subscribe();
        bus.publish(AgentMessage::new(
            AgentRole::Critic,
            MessageKind::Evaluation,
            "now someone is",
        ));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.sender, AgentRole::Critic);
    }

    #[test]
    fn test_heartbeat_constants() {
        assert_eq!(HEARTBEAT_INTERVAL, Duration::from_secs(30));
        assert_eq!(CLIENT_TIMEOUT, Duration::from_secs(10));
    }
}
