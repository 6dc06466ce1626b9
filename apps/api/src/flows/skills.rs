use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::flows::prompts::{ROLE_SKILLS_PERSONA, ROLE_SKILLS_PROMPT_TEMPLATE};
use crate::flows::{require_text, run_json_flow, FlowKind};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::LanguageModel;

pub const MAX_SKILLS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSkillsInput {
    pub role_name: String,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSkills {
    pub skills: Vec<String>,
}

/// Top skills for a role at a company.
pub async fn generate_role_skills(
    input: &RoleSkillsInput,
    llm: &dyn LanguageModel,
) -> Result<RoleSkills, AppError> {
    require_text("role_name", &input.role_name)?;
    require_text("company_name", &input.company_name)?;

    let prompt = fill_template(
        ROLE_SKILLS_PROMPT_TEMPLATE,
        &[
            ("role_name", input.role_name.trim()),
            ("company_name", input.company_name.trim()),
        ],
    );

    let raw: RoleSkills =
        run_json_flow(llm, FlowKind::RoleSkills, ROLE_SKILLS_PERSONA, &prompt).await?;

    let skills = dedup_skills(raw.skills);
    if skills.is_empty() {
        return Err(FlowKind::RoleSkills.malformed("no skills in output"));
    }
    Ok(RoleSkills { skills })
}

/// Trims, drops blanks and case-insensitive duplicates, keeps the first
/// `MAX_SKILLS` in model order.
fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(MAX_SKILLS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[test]
    fn test_dedup_skills() {
        let skills = vec![
            "Rust".to_string(),
            " rust ".to_string(),
            "".to_string(),
            "Communication".to_string(),
        ];
        assert_eq!(dedup_skills(skills), vec!["Rust", "Communication"]);
    }

    #[test]
    fn test_dedup_caps_at_ten() {
        let skills = (0..15).map(|i| format!("Skill {i}")).collect();
        assert_eq!(dedup_skills(skills).len(), MAX_SKILLS);
    }

    #[tokio::test]
    async fn test_role_skills_prompt() {
        let model =
            ScriptedModel::new().with_response(r#"{"skills": ["SQL", "Python", "Storytelling"]}"#);
        let input = RoleSkillsInput {
            role_name: "Data Analyst".to_string(),
            company_name: "Globex".to_string(),
        };
        let result = generate_role_skills(&input, &model).await.unwrap();
        assert_eq!(result.skills, vec!["SQL", "Python", "Storytelling"]);
        assert!(model.prompts()[0].contains("Role: Data Analyst\nCompany: Globex"));
    }
}
