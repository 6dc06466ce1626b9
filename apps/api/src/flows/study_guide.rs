use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::flows::learning_path::{normalize_skills, LearningPath};
use crate::flows::prompts::{STUDY_GUIDE_PERSONA, STUDY_GUIDE_PROMPT_TEMPLATE};
use crate::flows::{clean_list, run_json_flow, FlowKind};
use crate::llm_client::prompts::{bullet_list, fill_template};
use crate::llm_client::LanguageModel;

/// Same shape as a learning path, seeded by an explicit skill list.
pub type StudyGuide = LearningPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGuideInput {
    pub skills: Vec<String>,
}

pub async fn generate_study_guide(
    input: &StudyGuideInput,
    llm: &dyn LanguageModel,
) -> Result<StudyGuide, AppError> {
    let skills = clean_list(&input.skills);
    if skills.is_empty() {
        return Err(AppError::Validation(
            "skills must contain at least one entry".to_string(),
        ));
    }

    let skill_list = bullet_list(&skills);
    let prompt = fill_template(STUDY_GUIDE_PROMPT_TEMPLATE, &[("skills", skill_list.as_str())]);
    let raw: StudyGuide =
        run_json_flow(llm, FlowKind::StudyGuide, STUDY_GUIDE_PERSONA, &prompt).await?;

    normalize_skills(raw).map_err(|e| FlowKind::StudyGuide.malformed(e))
}
