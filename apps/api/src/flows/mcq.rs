//! Multiple-choice variant of an open interview question.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::flows::prompts::{MCQ_PERSONA, MCQ_PROMPT_TEMPLATE};
use crate::flows::{require_text, run_json_flow, FlowKind};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::LanguageModel;

const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqInput {
    pub question: String,
    pub role: String,
}

/// Invariant: `correct_answer` is exactly one of `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

pub async fn generate_mcq(input: &McqInput, llm: &dyn LanguageModel) -> Result<Mcq, AppError> {
    require_text("question", &input.question)?;
    require_text("role", &input.role)?;

    let prompt = fill_template(
        MCQ_PROMPT_TEMPLATE,
        &[
            ("role", input.role.trim()),
            ("question", input.question.trim()),
        ],
    );

    let raw: Mcq = run_json_flow(llm, FlowKind::Mcq, MCQ_PERSONA, &prompt).await?;

    validate(raw).map_err(|e| FlowKind::Mcq.malformed(e))
}

fn validate(raw: Mcq) -> Result<Mcq, String> {
    let question = raw.question.trim().to_string();
    if question.is_empty() {
        return Err("empty question".to_string());
    }

    let mut seen = HashSet::new();
    let options: Vec<String> = raw
        .options
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty() && seen.insert(o.clone()))
        .collect();
    if options.len() < MIN_OPTIONS {
        return Err(format!("only {} distinct options", options.len()));
    }

    // Exact match first; a case-only mismatch is normalized to the option text.
    let wanted = raw.correct_answer.trim();
    let lowered = wanted.to_lowercase();
    let correct_answer = options
        .iter()
        .find(|o| o.as_str() == wanted)
        .or_else(|| options.iter().find(|o| o.to_lowercase() == lowered))
        .cloned()
        .ok_or_else(|| format!("correct answer '{wanted}' is not among the options"))?;

    Ok(Mcq {
        question,
        options,
        correct_answer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    fn raw(options: &[&str], correct: &str) -> Mcq {
        Mcq {
            question: "Which structure gives O(1) average lookup?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.to_string(),
        }
    }

    #[test]
    fn test_correct_answer_must_be_an_option() {
        let err = validate(raw(&["Array", "Linked list"], "Hash map")).unwrap_err();
        assert!(err.contains("not among the options"));
    }

    #[test]
    fn test_case_mismatch_is_normalized() {
        let mcq = validate(raw(&["Array", "Hash map", "Heap"], " hash MAP ")).unwrap();
        assert_eq!(mcq.correct_answer, "Hash map");
    }

    #[test]
    fn test_duplicate_and_blank_options_removed() {
        let mcq = validate(raw(&["Heap", " Heap", "", "Trie"], "Trie")).unwrap();
        assert_eq!(mcq.options, vec!["Heap", "Trie"]);
    }

    #[test]
    fn test_single_option_rejected() {
        assert!(validate(raw(&["Heap", "Heap"], "Heap")).is_err());
    }

    #[tokio::test]
    async fn test_generate_mcq() {
        let model = ScriptedModel::new().with_response(
            r#"{"question": "What does ACID's I stand for?",
                "options": ["Isolation", "Integrity", "Indexing", "Idempotency"],
                "correct_answer": "Isolation"}"#,
        );
        let input = McqInput {
            question: "Explain database transactions".to_string(),
            role: "Backend Engineer".to_string(),
        };
        let mcq = generate_mcq(&input, &model).await.unwrap();
        assert_eq!(mcq.options.len(), 4);
        assert!(mcq.options.contains(&mcq.correct_answer));
        assert!(model.prompts()[0].contains("Original Question: Explain database transactions"));
    }
}
