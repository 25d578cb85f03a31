use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use interview_core::{AgentMessage, FinalReport, InterviewPhase, MemoryEntry};
use orchestrator::report::compile_report;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartInterviewRequest {
    pub candidate_name: String,
    pub resume: String,
}

#[derive(Serialize, ToSchema)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub status: String,
    pub phase: InterviewPhase,
    pub candidate: String,
    #[schema(value_type = Object)]
    pub skill_profile: Option<Value>,
    pub difficulty: String,
    /// Sessions remembered for this candidate before this one.
    pub previous_sessions: usize,
}

#[utoipa::path(
    post,
    path = "/api/interviews",
    request_body = StartInterviewRequest,
    responses(
        (status = 201, description = "Interview started", body = StartInterviewResponse),
        (status = 400, description = "Invalid request"),
    ),
    tag = "interviews"
)]
pub async fn start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<StartInterviewResponse>), AppError> {
    if request.candidate_name.trim().is_empty() {
        return Err(AppError::BadRequest("candidate_name is required".to_string()));
    }

    let previous_sessions = state
        .memory
        .count_sessions_for_subject(&request.candidate_name)
        .await?;

    let (session_id, shared) = state
        .registry
        .create(request.candidate_name.clone(), Some(request.resume))
        .await;

    let mut ctx = shared.lock().await;
    state
        .runner
        .advance(&mut ctx, Some(InterviewPhase::ResumeAnalysis))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StartInterviewResponse {
            session_id,
            status: "started".to_string(),
            phase: ctx.current_phase,
            candidate: ctx.candidate_name.clone(),
            skill_profile: ctx.skill_profile.clone(),
            difficulty: ctx.difficulty.to_string(),
            previous_sessions,
        }),
    ))
}

#[derive(Serialize, ToSchema)]
pub struct InterviewStatusResponse {
    pub session_id: Uuid,
    pub candidate: String,
    pub phase: InterviewPhase,
    pub difficulty: String,
    pub messages_count: usize,
    pub questions_asked: u32,
    #[schema(value_type = Object)]
    pub scores: HashMap<String, Value>,
    #[schema(value_type = Object)]
    pub current_question: Option<Value>,
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Interview status", body = InterviewStatusResponse),
        (status = 404, description = "Session not found"),
    ),
    tag = "interviews"
)]
pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewStatusResponse>, AppError> {
    let shared = state.registry.get(id).await?;
    let ctx = shared.lock().await;

    Ok(Json(InterviewStatusResponse {
        session_id: ctx.id,
        candidate: ctx.candidate_name.clone(),
        phase: ctx.current_phase,
        difficulty: ctx.difficulty.to_string(),
        messages_count: ctx.messages.len(),
        questions_asked: ctx.questions_asked,
        scores: ctx.scores.clone(),
        current_question: ctx.current_question.clone(),
    }))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdvanceRequest {
    /// Explicit target phase; omitted means "follow the workflow graph".
    pub target: Option<InterviewPhase>,
}

#[derive(Serialize, ToSchema)]
pub struct AdvanceResponse {
    pub session_id: Uuid,
    pub phase: InterviewPhase,
    #[schema(value_type = Object)]
    pub current_question: Option<Value>,
    /// Messages published during this step.
    pub messages: Vec<AgentMessage>,
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/advance",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = AdvanceRequest,
    responses(
        (status = 200, description = "Workflow advanced", body = AdvanceResponse),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Illegal phase transition"),
    ),
    tag = "interviews"
)]
pub async fn advance_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<AdvanceRequest>>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let target = request.and_then(|Json(r)| r.target);

    let shared = state.registry.get(id).await?;
    let mut ctx = shared.lock().await;

    let before = ctx.messages.len();
    let phase = state.runner.advance(&mut ctx, target).await?;

    Ok(Json(AdvanceResponse {
        session_id: ctx.id,
        phase,
        current_question: ctx.current_question.clone(),
        messages: ctx.messages[before..].to_vec(),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Serialize, ToSchema)]
pub struct AnswerResponse {
    pub session_id: Uuid,
    pub phase: InterviewPhase,
    /// Evaluation messages produced for this answer.
    pub evaluations: Vec<AgentMessage>,
    #[schema(value_type = Object)]
    pub scores: HashMap<String, Value>,
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/answer",
    params(("id" = Uuid, Path, description = "Session ID")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer evaluated", body = AnswerResponse),
        (status = 404, description = "Session not found"),
    ),
    tag = "interviews"
)]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let shared = state.registry.get(id).await?;
    let mut ctx = shared.lock().await;

    let before = ctx.messages.len();
    state.runner.submit_answer(&mut ctx, &request.answer).await?;

    Ok(Json(AnswerResponse {
        session_id: ctx.id,
        phase: ctx.current_phase,
        evaluations: ctx.messages[before..].to_vec(),
        scores: ctx.scores.clone(),
    }))
}

#[derive(Serialize, ToSchema)]
pub struct HintResponse {
    pub hint: String,
    pub hints_remaining: usize,
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/hint",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Next hint", body = HintResponse),
        (status = 400, description = "No active question"),
        (status = 404, description = "Session not found"),
    ),
    tag = "interviews"
)]
pub async fn get_hint(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HintResponse>, AppError> {
    let shared = state.registry.get(id).await?;
    let mut ctx = shared.lock().await;

    let hint = state.runner.hint(&mut ctx).await?;
    Ok(Json(HintResponse {
        hint: hint.text,
        hints_remaining: hint.remaining,
    }))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}/messages",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session message log", body = Vec<AgentMessage>),
        (status = 404, description = "Session not found"),
    ),
    tag = "interviews"
)]
pub async fn get_interview_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AgentMessage>>, AppError> {
    let shared = state.registry.get(id).await?;
    let ctx = shared.lock().await;
    Ok(Json(ctx.messages.clone()))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}/report",
    params(("id" = Uuid, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Final report", body = FinalReport),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Report not generated yet"),
    ),
    tag = "interviews"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FinalReport>, AppError> {
    let shared = state.registry.get(id).await?;
    let ctx = shared.lock().await;

    if !matches!(
        ctx.current_phase,
        InterviewPhase::ReportGeneration | InterviewPhase::Completed
    ) {
        return Err(AppError::Conflict(format!(
            "Report is not available in phase {}",
            ctx.current_phase
        )));
    }

    Ok(Json(compile_report(&ctx)))
}

#[derive(Debug, Deserialize)]
pub struct SessionMemoryQuery {
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}/memory",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("limit" = Option<usize>, Query, description = "Max entries, default 50"),
    ),
    responses(
        (status = 200, description = "Remembered entries for this session", body = Vec<MemoryEntry>),
        (status = 404, description = "Session not found"),
    ),
    tag = "memory"
)]
pub async fn get_interview_memory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SessionMemoryQuery>,
) -> Result<Json<Vec<MemoryEntry>>, AppError> {
    // 404 for unknown sessions even though the memory store itself would
    // just return nothing.
    state.registry.get(id).await?;

    let entries = state
        .memory
        .get_session_history(id, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(entries))
}
