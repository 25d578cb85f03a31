//! Message bus for Interview Studio.
//!
//! This crate provides the pub/sub fanout, the append-only message history,
//! and the FIFO pull queue that the orchestrator publishes role output
//! through. Three consumption styles coexist on one bus: push callbacks for
//! live feeds, a blocking pull for sequential consumers, and filtered
//! history queries for after-the-fact inspection.

mod bus;
mod types;

pub use bus::MessageBus;
pub use types::{BusError, CallbackError, HistoryFilter, SubscriberCallback};
