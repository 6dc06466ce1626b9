//! Learning plan: a topic-wise plan targeting the weak areas found in an
//! assessment.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::flows::prompts::{LEARNING_PLAN_PERSONA, LEARNING_PLAN_PROMPT_TEMPLATE};
use crate::flows::{clean_list, require_text, run_json_flow, FlowKind};
use crate::llm_client::prompts::{bullet_list, fill_template};
use crate::llm_client::LanguageModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPlanInput {
    pub role_name: String,
    pub questions: Vec<String>,
    pub weak_areas: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    /// Markdown.
    pub learning_plan: String,
}

pub async fn generate_learning_plan(
    input: &LearningPlanInput,
    llm: &dyn LanguageModel,
) -> Result<LearningPlan, AppError> {
    require_text("role_name", &input.role_name)?;
    require_text("weak_areas", &input.weak_areas)?;

    let questions = bullet_list(&clean_list(&input.questions));
    let prompt = fill_template(
        LEARNING_PLAN_PROMPT_TEMPLATE,
        &[
            ("role_name", input.role_name.trim()),
            ("questions", questions.as_str()),
            ("weak_areas", input.weak_areas.trim()),
        ],
    );

    let plan: LearningPlan =
        run_json_flow(llm, FlowKind::LearningPlan, LEARNING_PLAN_PERSONA, &prompt).await?;

    let learning_plan = plan.learning_plan.trim().to_string();
    if learning_plan.is_empty() {
        return Err(FlowKind::LearningPlan.malformed("empty learning plan"));
    }
    Ok(LearningPlan { learning_plan })
}
