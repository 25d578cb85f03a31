use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use events::BusError;
use orchestrator::OrchestratorError;

#[derive(Debug)]
#[allow(dead_code)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Timeout(String),
    Internal(String),
    Orchestrator(OrchestratorError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            AppError::Timeout(msg) => (StatusCode::REQUEST_TIMEOUT, "timeout", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            AppError::Orchestrator(err) => {
                match &err {
                    OrchestratorError::SessionNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        "not_found",
                        format!("Session not found: {}", id),
                    ),
                    OrchestratorError::InvalidTransition { .. }
                    | OrchestratorError::NoSuccessor(_) => {
                        (StatusCode::CONFLICT, "invalid_transition", err.to_string())
                    }
                    OrchestratorError::NoActiveQuestion(_) => {
                        (StatusCode::BAD_REQUEST, "bad_request", err.to_string())
                    }
                    _ => {
                        tracing::error!("Orchestrator error: {:?}", err);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "orchestrator_error",
                            err.to_string(),
                        )
                    }
                }
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        AppError::Orchestrator(err)
    }
}

impl From<BusError> for AppError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout => AppError::Timeout("No message arrived in time".to_string()),
            BusError::Closed => AppError::Internal("Message bus is closed".to_string()),
        }
    }
}

impl From<memory::MemoryError> for AppError {
    fn from(err: memory::MemoryError) -> Self {
        tracing::error!("Memory error: {:?}", err);
        AppError::Internal("Memory backend error".to_string())
    }
}
