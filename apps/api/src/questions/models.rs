use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive; anything other than easy/medium/hard is `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// All questions uploaded for one role (one worksheet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleQuestions {
    pub name: String,
    pub questions: Vec<Question>,
}

/// A parsed upload: company name from the file name, roles in sheet order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub company: String,
    pub roles: Vec<RoleQuestions>,
}

impl QuestionBank {
    pub fn role(&self, name: &str) -> Option<&RoleQuestions> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn question_count(&self) -> usize {
        self.roles.iter().map(|r| r.questions.len()).sum()
    }
}

impl RoleQuestions {
    pub fn question_texts(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.question.clone()).collect()
    }
}
