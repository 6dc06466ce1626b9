//! Axum route handlers for the session (view state machine) API.
//!
//! Every mutating handler holds the session's in-flight guard for its whole
//! load → model call → save cycle.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::assessment::assess_answer;
use crate::flows::learning_path::{generate_learning_path, RenderedLearningPath};
use crate::flows::learning_plan::generate_learning_plan;
use crate::flows::mcq::{generate_mcq, Mcq};
use crate::flows::narration::{narrate, Narration};
use crate::questions::handlers::read_upload;
use crate::questions::parser::parse_upload;
use crate::sessions::machine::{Session, SessionView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_session(state: &AppState, id: Uuid) -> Result<Session, AppError> {
    state
        .sessions
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// Loads a session for a read-only request and counts the request as activity.
async fn load_active_session(state: &AppState, id: Uuid) -> Result<Session, AppError> {
    let session = load_session(state, id).await?;
    state.sessions.keep_alive(id).await?;
    Ok(session)
}

async fn save_session(state: &AppState, session: &mut Session) -> Result<SessionView, AppError> {
    session.touch();
    state.sessions.save(session).await?;
    Ok(session.view())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let mut session = Session::new();
    let view = save_session(&state, &mut session).await?;
    tracing::info!(session_id = %session.id, "Session created");
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(load_active_session(&state, id).await?.view()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let _guard = state.inflight.acquire(id)?;
    if !state.sessions.delete(id).await? {
        return Err(AppError::NotFound(format!("Session {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/upload
///
/// Multipart body with a `file` field (.xlsx or .csv). The file name becomes
/// the company name.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;

    let upload = read_upload(multipart).await?;
    let bank = parse_upload(&upload.file_name, &upload.bytes)?;
    session.upload(bank)?;

    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/role
pub async fn handle_select_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRoleRequest>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;
    session.select_role(&request.role)?;
    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/answer
///
/// Grades the answer to the current question and moves to feedback.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;

    let input = session.prepare_assessment(&request.answer)?;
    let assessment = assess_answer(&input, state.llm.as_ref()).await?;
    session.record_assessment(request.answer, assessment)?;

    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/learning-plan
///
/// Only available for weak answers (score below 70).
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;

    let input = session.prepare_learning_plan()?;
    let plan = generate_learning_plan(&input, state.llm.as_ref()).await?;
    session.record_learning_plan(plan)?;

    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/next
pub async fn handle_next_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;
    session.next_question()?;
    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/try-again
pub async fn handle_try_again(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;
    session.try_again()?;
    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/start-over
pub async fn handle_start_over(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let mut session = load_session(&state, id).await?;
    session.start_over();
    Ok(Json(save_session(&state, &mut session).await?))
}

/// POST /api/v1/sessions/:id/mcq
///
/// Multiple-choice variant of the current question. Does not change the view.
pub async fn handle_session_mcq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mcq>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let session = load_active_session(&state, id).await?;
    let input = session.mcq_input()?;
    Ok(Json(generate_mcq(&input, state.llm.as_ref()).await?))
}

/// POST /api/v1/sessions/:id/narration
pub async fn handle_session_narration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Narration>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let session = load_active_session(&state, id).await?;
    let input = session.narration_input()?;
    Ok(Json(narrate(&input, state.speech.as_deref()).await?))
}

/// POST /api/v1/sessions/:id/learning-path
pub async fn handle_session_learning_path(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderedLearningPath>, AppError> {
    let _guard = state.inflight.acquire(id)?;
    let session = load_active_session(&state, id).await?;
    let input = session.learning_path_input()?;
    let path = generate_learning_path(&input, state.llm.as_ref()).await?;
    Ok(Json(path.rendered()))
}
