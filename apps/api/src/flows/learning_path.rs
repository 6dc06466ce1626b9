//! Learning path: the 5-7 most critical skills for a role, each with a short
//! description and 2-3 public resources. Also the shared `Skill` shape used by
//! the study guide.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::flows::prompts::{LEARNING_PATH_PERSONA, LEARNING_PATH_PROMPT_TEMPLATE};
use crate::flows::{clean_list, require_text, run_json_flow, FlowKind};
use crate::llm_client::prompts::{bullet_list, fill_template};
use crate::llm_client::LanguageModel;

pub const MIN_RESOURCES: usize = 2;
pub const MAX_RESOURCES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Ordered skills with their resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub skills: Vec<Skill>,
}

/// A learning path plus its markdown rendering, as returned over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedLearningPath {
    pub skills: Vec<Skill>,
    pub markdown: String,
}

impl LearningPath {
    /// Renders as `### name`, the description, then `*   [title](url)` lines.
    pub fn to_markdown(&self) -> String {
        self.skills
            .iter()
            .map(|skill| {
                let mut section = format!("### {}\n{}\n", skill.name, skill.description);
                for resource in &skill.resources {
                    section.push_str(&format!("*   [{}]({})\n", resource.title, resource.url));
                }
                section
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn rendered(self) -> RenderedLearningPath {
        let markdown = self.to_markdown();
        RenderedLearningPath {
            skills: self.skills,
            markdown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPathInput {
    pub role_name: String,
    pub company_name: String,
    pub questions: Vec<String>,
}

pub async fn generate_learning_path(
    input: &LearningPathInput,
    llm: &dyn LanguageModel,
) -> Result<LearningPath, AppError> {
    require_text("role_name", &input.role_name)?;

    let questions = bullet_list(&clean_list(&input.questions));
    let prompt = fill_template(
        LEARNING_PATH_PROMPT_TEMPLATE,
        &[
            ("role_name", input.role_name.trim()),
            ("company_name", input.company_name.trim()),
            ("questions", questions.as_str()),
        ],
    );

    let raw: LearningPath =
        run_json_flow(llm, FlowKind::LearningPath, LEARNING_PATH_PERSONA, &prompt).await?;

    normalize_skills(raw).map_err(|e| FlowKind::LearningPath.malformed(e))
}

/// Drops nameless skills and url-less resources, caps resources per skill,
/// and fails if nothing usable is left.
pub(crate) fn normalize_skills(raw: LearningPath) -> Result<LearningPath, String> {
    let skills: Vec<Skill> = raw
        .skills
        .into_iter()
        .filter(|s| !s.name.trim().is_empty())
        .map(|skill| {
            let mut resources: Vec<Resource> = skill
                .resources
                .into_iter()
                .filter(|r| !r.url.trim().is_empty())
                .map(|r| {
                    let url = r.url.trim().to_string();
                    let title = match r.title.trim() {
                        "" => url.clone(),
                        t => t.to_string(),
                    };
                    Resource { title, url }
                })
                .collect();
            resources.truncate(MAX_RESOURCES);
            if resources.len() < MIN_RESOURCES {
                warn!(
                    skill = %skill.name,
                    resources = resources.len(),
                    "Skill has fewer resources than requested"
                );
            }
            Skill {
                name: skill.name.trim().to_string(),
                description: skill.description.trim().to_string(),
                resources,
            }
        })
        .collect();

    if skills.is_empty() {
        return Err("no skills in output".to_string());
    }
    Ok(LearningPath { skills })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    fn resource(n: u32) -> Resource {
        Resource {
            title: format!("Doc {n}"),
            url: format!("https://example.com/{n}"),
        }
    }

    #[test]
    fn test_markdown_matches_guide_format() {
        let path = LearningPath {
            skills: vec![Skill {
                name: "SQL".to_string(),
                description: "Querying relational data.".to_string(),
                resources: vec![resource(1), resource(2)],
            }],
        };
        assert_eq!(
            path.to_markdown(),
            "### SQL\nQuerying relational data.\n\
             *   [Doc 1](https://example.com/1)\n\
             *   [Doc 2](https://example.com/2)\n"
        );
    }

    #[test]
    fn test_normalize_caps_resources_and_drops_blank_skills() {
        let raw = LearningPath {
            skills: vec![
                Skill {
                    name: " Rust ".to_string(),
                    description: "Systems language.".to_string(),
                    resources: vec![resource(1), resource(2), resource(3), resource(4)],
                },
                Skill {
                    name: "".to_string(),
                    description: "ghost".to_string(),
                    resources: vec![],
                },
            ],
        };
        let path = normalize_skills(raw).unwrap();
        assert_eq!(path.skills.len(), 1);
        assert_eq!(path.skills[0].name, "Rust");
        assert_eq!(path.skills[0].resources.len(), MAX_RESOURCES);
    }

    #[test]
    fn test_normalize_uses_url_when_title_missing() {
        let raw = LearningPath {
            skills: vec![Skill {
                name: "Go".to_string(),
                description: String::new(),
                resources: vec![
                    Resource {
                        title: " ".to_string(),
                        url: "https://go.dev/doc".to_string(),
                    },
                    Resource {
                        title: "No link".to_string(),
                        url: "".to_string(),
                    },
                ],
            }],
        };
        let path = normalize_skills(raw).unwrap();
        assert_eq!(
            path.skills[0].resources,
            vec![Resource {
                title: "https://go.dev/doc".to_string(),
                url: "https://go.dev/doc".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_learning_path_end_to_end() {
        let model = ScriptedModel::new().with_response(
            r#"{"skills": [{"name": "System Design", "description": "Designing at scale.",
                "resources": [{"title": "Primer", "url": "https://example.com/primer"},
                              {"title": "Paper", "url": "https://example.com/paper"}]}]}"#,
        );
        let input = LearningPathInput {
            role_name: "SRE".to_string(),
            company_name: "Initech".to_string(),
            questions: vec!["How do you handle an outage?".to_string()],
        };
        let path = generate_learning_path(&input, &model).await.unwrap();
        assert_eq!(path.skills[0].name, "System Design");

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Company: Initech"));
        assert!(prompt.contains("- How do you handle an outage?"));
    }

    #[tokio::test]
    async fn test_empty_skill_list_is_malformed() {
        let model = ScriptedModel::new().with_response(r#"{"skills": []}"#);
        let input = LearningPathInput {
            role_name: "SRE".to_string(),
            company_name: "Initech".to_string(),
            questions: vec![],
        };
        let err = generate_learning_path(&input, &model).await.unwrap_err();
        assert!(matches!(err, AppError::Llm { .. }));
    }
}
