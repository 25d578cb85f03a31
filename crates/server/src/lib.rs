pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Interview Studio API",
        version = "0.1.0",
        description = "API for Interview Studio - multi-agent technical interview orchestration"
    ),
    paths(
        routes::health_check,
        routes::start_interview,
        routes::get_interview,
        routes::advance_interview,
        routes::submit_answer,
        routes::get_hint,
        routes::get_interview_messages,
        routes::get_report,
        routes::get_interview_memory,
        routes::get_message_history,
        routes::pull_next_message,
        routes::clear_message_history,
        routes::search_memory,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::StartInterviewRequest,
        routes::StartInterviewResponse,
        routes::InterviewStatusResponse,
        routes::AdvanceRequest,
        routes::AdvanceResponse,
        routes::AnswerRequest,
        routes::AnswerResponse,
        routes::HintResponse,
        routes::SearchHitResponse,
        interview_core::AgentMessage,
        interview_core::AgentRole,
        interview_core::InterviewPhase,
        interview_core::MessageKind,
        interview_core::Difficulty,
        interview_core::FinalReport,
        interview_core::MemoryEntry,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "interviews", description = "Interview lifecycle endpoints"),
        (name = "messages", description = "Message bus history and pull queue"),
        (name = "memory", description = "Similarity memory endpoints"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/interviews", post(routes::start_interview))
        .route("/api/interviews/{id}", get(routes::get_interview))
        .route(
            "/api/interviews/{id}/advance",
            post(routes::advance_interview),
        )
        .route("/api/interviews/{id}/answer", post(routes::submit_answer))
        .route("/api/interviews/{id}/hint", post(routes::get_hint))
        .route(
            "/api/interviews/{id}/messages",
            get(routes::get_interview_messages),
        )
        .route("/api/interviews/{id}/report", get(routes::get_report))
        .route(
            "/api/interviews/{id}/memory",
            get(routes::get_interview_memory),
        )
        .route(
            "/api/messages",
            get(routes::get_message_history).delete(routes::clear_message_history),
        )
        .route("/api/messages/next", get(routes::pull_next_message))
        .route("/api/memory/search", get(routes::search_memory))
        .route("/ws", get(routes::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
