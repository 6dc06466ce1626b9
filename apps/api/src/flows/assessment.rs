//! Answer assessment: grades a free-text answer against the question and,
//! when available, the expected answer.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::flows::prompts::{
    ASSESS_ANSWER_PERSONA, ASSESS_ANSWER_PROMPT_TEMPLATE, EXPECTED_ANSWER_BLOCK_TEMPLATE,
};
use crate::flows::{require_text, run_json_flow, FlowKind};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::LanguageModel;

/// Scores strictly below this are weak and unlock a learning plan.
pub const WEAK_SCORE_THRESHOLD: u8 = 70;

pub const EMPTY_ANSWER_MESSAGE: &str = "Please provide an answer before submitting.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessAnswerInput {
    pub question: String,
    pub user_answer: String,
    #[serde(default)]
    pub expected_answer: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerAssessment {
    /// 0 – 100
    pub score: u8,
    pub strengths: String,
    pub gaps: String,
}

impl AnswerAssessment {
    pub fn is_weak(&self) -> bool {
        self.score < WEAK_SCORE_THRESHOLD
    }
}

/// Models sometimes answer `85.0`; accept any number and range-check it.
#[derive(Debug, Deserialize)]
struct RawAssessment {
    score: f64,
    strengths: String,
    gaps: String,
}

pub async fn assess_answer(
    input: &AssessAnswerInput,
    llm: &dyn LanguageModel,
) -> Result<AnswerAssessment, AppError> {
    if input.user_answer.trim().is_empty() {
        return Err(AppError::Validation(EMPTY_ANSWER_MESSAGE.to_string()));
    }
    require_text("question", &input.question)?;
    require_text("role", &input.role)?;

    let raw: RawAssessment = run_json_flow(
        llm,
        FlowKind::AssessAnswer,
        ASSESS_ANSWER_PERSONA,
        &render_prompt(input),
    )
    .await?;

    validate(raw).map_err(|e| FlowKind::AssessAnswer.malformed(e))
}

fn render_prompt(input: &AssessAnswerInput) -> String {
    let expected_answer_block = match input.expected_answer.as_deref().map(str::trim) {
        Some(expected) if !expected.is_empty() => {
            fill_template(EXPECTED_ANSWER_BLOCK_TEMPLATE, &[("expected_answer", expected)])
        }
        _ => String::new(),
    };

    fill_template(
        ASSESS_ANSWER_PROMPT_TEMPLATE,
        &[
            ("role", input.role.trim()),
            ("question", input.question.trim()),
            ("user_answer", input.user_answer.trim()),
            ("expected_answer_block", expected_answer_block.as_str()),
        ],
    )
}

fn validate(raw: RawAssessment) -> Result<AnswerAssessment, String> {
    if !raw.score.is_finite() || !(0.0..=100.0).contains(&raw.score) {
        return Err(format!("score {} is outside 0-100", raw.score));
    }
    Ok(AnswerAssessment {
        score: raw.score.round() as u8,
        strengths: raw.strengths.trim().to_string(),
        gaps: raw.gaps.trim().to_string(),
    })
}
