//! Orchestration engine for Interview Studio.
//!
//! The two load-bearing pieces live here: the phase state machine that
//! enforces the legal workflow graph, and the interview runner that invokes
//! the roles active in each phase and publishes their output on the message
//! bus. Roles are reached only through the [`Capability`] contract; the
//! engine never sees a concrete provider type.

pub mod capability;
pub mod error;
pub mod registry;
pub mod report;
pub mod roles;
pub mod runner;
pub mod services;
pub mod state_machine;

pub use capability::{build_message, AgentRegistry, Capability};
pub use error::{OrchestratorError, Result};
pub use registry::{SessionRegistry, SharedContext};
pub use runner::InterviewRunner;
pub use services::{LlmClient, LlmConfig};
pub use state_machine::{BranchPolicy, CodeAnswerBranch, InterviewStateMachine, PhaseHook};
