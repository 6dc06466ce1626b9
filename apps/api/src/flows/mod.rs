//! Flows: each one binds a fixed prompt template to an input/output schema
//! and runs it against the language model.
//!
//! All model calls go through `llm_client`; speech goes through `speech`.
//! Failures of any kind surface as `AppError::Llm` carrying the flow's
//! static user-facing message.

use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{call_json, prompts::json_system, LanguageModel};

pub mod assessment;
pub mod handlers;
pub mod learning_path;
pub mod learning_plan;
pub mod mcq;
pub mod narration;
pub mod prompts;
pub mod skills;
pub mod study_guide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    AssessAnswer,
    LearningPlan,
    LearningPath,
    StudyGuide,
    RoleSkills,
    Mcq,
    Narration,
}

impl FlowKind {
    pub fn name(self) -> &'static str {
        match self {
            FlowKind::AssessAnswer => "assess_answer",
            FlowKind::LearningPlan => "learning_plan",
            FlowKind::LearningPath => "learning_path",
            FlowKind::StudyGuide => "study_guide",
            FlowKind::RoleSkills => "role_skills",
            FlowKind::Mcq => "mcq",
            FlowKind::Narration => "narration",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            FlowKind::AssessAnswer => "Failed to get assessment from AI. Please try again.",
            FlowKind::LearningPlan => "Failed to generate learning plan from AI. Please try again.",
            FlowKind::LearningPath => "Failed to generate learning path from AI. Please try again.",
            FlowKind::StudyGuide => "Failed to generate study guide from AI. Please try again.",
            FlowKind::RoleSkills => "Failed to generate skills from AI. Please try again.",
            FlowKind::Mcq => "Failed to generate a multiple-choice question. Please try again.",
            FlowKind::Narration => "Failed to generate audio. Please try again.",
        }
    }

    /// The model answered, but not in a shape this flow accepts.
    pub fn malformed(self, detail: impl std::fmt::Display) -> AppError {
        AppError::llm(
            self.failure_message(),
            format!("{} returned malformed output: {detail}", self.name()),
        )
    }
}

/// Sends a rendered prompt and deserializes the JSON reply into `T`.
pub(crate) async fn run_json_flow<T: DeserializeOwned>(
    llm: &dyn LanguageModel,
    kind: FlowKind,
    persona: &str,
    prompt: &str,
) -> Result<T, AppError> {
    let started = Instant::now();
    let system = json_system(persona);

    match call_json::<T>(llm, prompt, &system).await {
        Ok(output) => {
            info!(
                flow = kind.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Flow completed"
            );
            Ok(output)
        }
        Err(e) => {
            warn!(
                flow = kind.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Flow failed: {e}"
            );
            Err(AppError::llm(
                kind.failure_message(),
                format!("{} failed: {e}", kind.name()),
            ))
        }
    }
}

/// Rejects blank required text fields before any model call.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Trims entries and drops blanks.
pub(crate) fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
