use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use interview_core::MemoryEntry;

use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Serialize, ToSchema)]
pub struct SearchHitResponse {
    pub entry: MemoryEntry,
    pub score: f32,
}

#[utoipa::path(
    get,
    path = "/api/memory/search",
    params(
        ("q" = String, Query, description = "Search query"),
        ("limit" = Option<usize>, Query, description = "Max results, default 5"),
    ),
    responses(
        (status = 200, description = "Ranked matches", body = Vec<SearchHitResponse>),
        (status = 400, description = "Empty query"),
    ),
    tag = "memory"
)]
pub async fn search_memory(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHitResponse>>, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::BadRequest("q must not be empty".to_string()));
    }

    let hits = state
        .memory
        .search(&query.q, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await?;

    Ok(Json(
        hits.into_iter()
            .map(|hit| SearchHitResponse {
                entry: hit.entry,
                score: hit.score,
            })
            .collect(),
    ))
}
