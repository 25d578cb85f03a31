//! Core domain types for Interview Studio.
//!
//! Everything the orchestrator, bus, and transport layers share lives here:
//! the phase and role vocabularies, the message record, and the per-session
//! interview context.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::CoreError;
