use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use events::HistoryFilter;
use interview_core::{AgentMessage, AgentRole, MessageKind};

use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_PULL_TIMEOUT_MS: u64 = 5_000;
const MAX_PULL_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

impl HistoryQuery {
    fn into_filter(self) -> Result<HistoryFilter, AppError> {
        let mut filter = HistoryFilter::new();
        if let Some(sender) = self.sender {
            filter = filter.sender(parse::<AgentRole>(&sender)?);
        }
        if let Some(receiver) = self.receiver {
            filter = filter.receiver(parse::<AgentRole>(&receiver)?);
        }
        if let Some(kind) = self.kind {
            filter = filter.kind(parse::<MessageKind>(&kind)?);
        }
        if let Some(limit) = self.limit {
            filter = filter.limit(limit);
        }
        Ok(filter)
    }
}

fn parse<T: std::str::FromStr>(value: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| AppError::BadRequest(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    params(
        ("sender" = Option<String>, Query, description = "Filter by sender role"),
        ("receiver" = Option<String>, Query, description = "Filter by receiver role"),
        ("kind" = Option<String>, Query, description = "Filter by message kind"),
        ("limit" = Option<usize>, Query, description = "Keep only the last N matches"),
    ),
    responses(
        (status = 200, description = "Bus history in publish order", body = Vec<AgentMessage>),
        (status = 400, description = "Unknown role or kind"),
    ),
    tag = "messages"
)]
pub async fn get_message_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AgentMessage>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.bus.get_history(&filter)))
}

#[derive(Debug, Default, Deserialize)]
pub struct PullQuery {
    pub timeout_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/messages/next",
    params(
        ("timeout_ms" = Option<u64>, Query, description = "How long to wait, default 5000, max 30000"),
    ),
    responses(
        (status = 200, description = "Next message from the pull queue", body = AgentMessage),
        (status = 408, description = "No message arrived in time"),
    ),
    tag = "messages"
)]
pub async fn pull_next_message(
    State(state): State<AppState>,
    Query(query): Query<PullQuery>,
) -> Result<Json<AgentMessage>, AppError> {
    let timeout_ms = query
        .timeout_ms
        .unwrap_or(DEFAULT_PULL_TIMEOUT_MS)
        .min(MAX_PULL_TIMEOUT_MS);

    let message = state
        .bus
        .get_message(Some(Duration::from_millis(timeout_ms)))
        .await?;
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/messages",
    responses(
        (status = 204, description = "History cleared"),
    ),
    tag = "messages"
)]
pub async fn clear_message_history(State(state): State<AppState>) -> StatusCode {
    state.bus.clear_history();
    StatusCode::NO_CONTENT
}
