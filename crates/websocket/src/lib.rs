//! WebSocket fanout of message-bus broadcast traffic.
//!
//! One bus subscriber bridges into a broadcast channel; every connected
//! client gets its own receiver, so a slow or dropped client never touches
//! the bus.

mod handler;
mod messages;

pub use handler::{ws_handler, WsState};
pub use messages::{ClientMessage, ServerMessage, SubscriptionFilter};
