use std::sync::Arc;

use events::MessageBus;
use memory::{MemoryStore, SimilarityStore};
use orchestrator::roles::standard_registry;
use orchestrator::{InterviewRunner, InterviewStateMachine, LlmClient, SessionRegistry};
use websocket::WsState;

use crate::config::StudioConfig;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub bus: MessageBus,
    pub runner: Arc<InterviewRunner>,
    pub memory: Arc<dyn MemoryStore>,
    pub ws: Arc<WsState>,
    pub llm_model: String,
}

impl AppState {
    pub fn new(config: &StudioConfig) -> Self {
        let bus = MessageBus::new();
        let memory: Arc<dyn MemoryStore> = Arc::new(SimilarityStore::new());

        let llm = LlmClient::new(config.llm.clone());
        let llm_model = llm.model().to_string();
        let agents = standard_registry(&llm);

        let runner = Arc::new(InterviewRunner::new(
            bus.clone(),
            InterviewStateMachine::standard(),
            agents,
            Arc::clone(&memory),
        ));
        let ws = Arc::new(WsState::new(&bus));

        Self {
            registry: Arc::new(SessionRegistry::new()),
            bus,
            runner,
            memory,
            ws,
            llm_model,
        }
    }
}
