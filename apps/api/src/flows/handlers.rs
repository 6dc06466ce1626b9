//! Axum route handlers for the stateless flow API.
//!
//! Each endpoint runs one flow on the request body. No session is involved.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::flows::assessment::{assess_answer, AnswerAssessment, AssessAnswerInput};
use crate::flows::learning_path::{generate_learning_path, LearningPathInput, RenderedLearningPath};
use crate::flows::learning_plan::{generate_learning_plan, LearningPlan, LearningPlanInput};
use crate::flows::mcq::{generate_mcq, Mcq, McqInput};
use crate::flows::narration::{narrate, Narration, NarrationInput};
use crate::flows::skills::{generate_role_skills, RoleSkills, RoleSkillsInput};
use crate::flows::study_guide::{generate_study_guide, StudyGuideInput};
use crate::state::AppState;

/// POST /api/v1/flows/assess-answer
pub async fn handle_assess_answer(
    State(state): State<AppState>,
    Json(input): Json<AssessAnswerInput>,
) -> Result<Json<AnswerAssessment>, AppError> {
    Ok(Json(assess_answer(&input, state.llm.as_ref()).await?))
}

/// POST /api/v1/flows/learning-plan
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    Json(input): Json<LearningPlanInput>,
) -> Result<Json<LearningPlan>, AppError> {
    Ok(Json(generate_learning_plan(&input, state.llm.as_ref()).await?))
}

/// POST /api/v1/flows/learning-path
///
/// Skills with resources, plus the same content rendered as markdown.
pub async fn handle_learning_path(
    State(state): State<AppState>,
    Json(input): Json<LearningPathInput>,
) -> Result<Json<RenderedLearningPath>, AppError> {
    let path = generate_learning_path(&input, state.llm.as_ref()).await?;
    Ok(Json(path.rendered()))
}

/// POST /api/v1/flows/study-guide
pub async fn handle_study_guide(
    State(state): State<AppState>,
    Json(input): Json<StudyGuideInput>,
) -> Result<Json<RenderedLearningPath>, AppError> {
    let guide = generate_study_guide(&input, state.llm.as_ref()).await?;
    Ok(Json(guide.rendered()))
}

/// POST /api/v1/flows/skills
pub async fn handle_role_skills(
    State(state): State<AppState>,
    Json(input): Json<RoleSkillsInput>,
) -> Result<Json<RoleSkills>, AppError> {
    Ok(Json(generate_role_skills(&input, state.llm.as_ref()).await?))
}

/// POST /api/v1/flows/mcq
pub async fn handle_mcq(
    State(state): State<AppState>,
    Json(input): Json<McqInput>,
) -> Result<Json<Mcq>, AppError> {
    Ok(Json(generate_mcq(&input, state.llm.as_ref()).await?))
}

/// POST /api/v1/flows/narration
///
/// 503 when no speech provider is configured.
pub async fn handle_narration(
    State(state): State<AppState>,
    Json(input): Json<NarrationInput>,
) -> Result<Json<Narration>, AppError> {
    Ok(Json(narrate(&input, state.speech.as_deref()).await?))
}
