//! The per-user view state machine.
//!
//! ```text
//! Upload ──upload──▶ RoleSelect ──select_role──▶ Assessment ──submit_answer──▶ Feedback
//!   ▲                                              ▲    ▲                     │  │  │
//!   │                                              │    └──────try_again──────┘  │  │
//!   │                                              └───next_question (more)──────┘  │
//!   │                                  Learning ◀──learning_plan (weak answer)──────┤
//!   │                                  Completed ◀─next_question (last)─────────────┘
//!   └──────────────────────── start_over (from any view) ───────────────────────────
//! ```
//!
//! Transitions are pure: handlers run the model call between a `prepare_*`
//! and the matching `record_*`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::flows::assessment::{AnswerAssessment, AssessAnswerInput, EMPTY_ANSWER_MESSAGE};
use crate::flows::learning_path::LearningPathInput;
use crate::flows::learning_plan::{LearningPlan, LearningPlanInput};
use crate::flows::mcq::McqInput;
use crate::flows::narration::NarrationInput;
use crate::questions::models::{Question, QuestionBank, RoleQuestions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Upload,
    RoleSelect,
    Assessment,
    Feedback,
    Learning,
    Completed,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Upload => "upload",
            View::RoleSelect => "role_select",
            View::Assessment => "assessment",
            View::Feedback => "feedback",
            View::Learning => "learning",
            View::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub view: View,
    pub bank: Option<QuestionBank>,
    pub selected_role: Option<String>,
    pub question_index: usize,
    pub last_answer: Option<String>,
    pub assessment: Option<AnswerAssessment>,
    pub learning_plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub name: String,
    pub question_count: usize,
}

/// What a client needs to render the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub view: View,
    pub company: Option<String>,
    pub roles: Vec<RoleSummary>,
    pub selected_role: Option<String>,
    pub question_index: Option<usize>,
    pub total_questions: usize,
    pub progress_percent: Option<f64>,
    pub current_question: Option<Question>,
    pub last_answer: Option<String>,
    pub assessment: Option<AnswerAssessment>,
    pub can_request_learning_plan: bool,
    pub learning_plan: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            view: View::Upload,
            bank: None,
            selected_role: None,
            question_index: 0,
            last_answer: None,
            assessment: None,
            learning_plan: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn role(&self) -> Option<&RoleQuestions> {
        let role = self.selected_role.as_deref()?;
        self.bank.as_ref()?.role(role)
    }

    pub fn questions(&self) -> &[Question] {
        self.role().map(|r| r.questions.as_slice()).unwrap_or(&[])
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions().get(self.question_index)
    }

    /// `(index + 1) / total * 100` once a role is selected.
    pub fn progress_percent(&self) -> Option<f64> {
        let total = self.questions().len();
        if total == 0 {
            return None;
        }
        Some((self.question_index + 1) as f64 / total as f64 * 100.0)
    }

    pub fn can_request_learning_plan(&self) -> bool {
        self.view == View::Feedback && self.assessment.as_ref().is_some_and(|a| a.is_weak())
    }

    fn expect_view(&self, allowed: &[View], action: &str) -> Result<(), AppError> {
        if allowed.contains(&self.view) {
            return Ok(());
        }
        Err(AppError::Conflict(format!(
            "Cannot {action} from the {} view",
            self.view.as_str()
        )))
    }

    fn set_view(&mut self, to: View) {
        if self.view != to {
            info!(
                session_id = %self.id,
                from = self.view.as_str(),
                to = to.as_str(),
                "Session view changed"
            );
        }
        self.view = to;
    }

    fn current_question_or_conflict(&self) -> Result<&Question, AppError> {
        self.current_question()
            .ok_or_else(|| AppError::Conflict("There is no current question".to_string()))
    }

    fn role_name_or_conflict(&self) -> Result<&str, AppError> {
        self.selected_role
            .as_deref()
            .ok_or_else(|| AppError::Conflict("Select a role first".to_string()))
    }

    pub fn upload(&mut self, bank: QuestionBank) -> Result<(), AppError> {
        self.expect_view(&[View::Upload], "upload a file")?;
        self.bank = Some(bank);
        self.set_view(View::RoleSelect);
        Ok(())
    }

    pub fn select_role(&mut self, role: &str) -> Result<(), AppError> {
        self.expect_view(&[View::RoleSelect], "select a role")?;
        let bank = self
            .bank
            .as_ref()
            .ok_or_else(|| AppError::Conflict("Upload a file first".to_string()))?;
        let found = bank
            .role(role)
            .ok_or_else(|| AppError::NotFound(format!("Role \"{role}\" not found")))?;
        if found.questions.is_empty() {
            return Err(AppError::Validation(format!(
                "Role \"{role}\" has no questions."
            )));
        }

        self.selected_role = Some(found.name.clone());
        self.question_index = 0;
        self.set_view(View::Assessment);
        Ok(())
    }

    /// Checks that an answer can be submitted and builds the assessment input.
    pub fn prepare_assessment(&self, answer: &str) -> Result<AssessAnswerInput, AppError> {
        self.expect_view(&[View::Assessment], "submit an answer")?;
        if answer.trim().is_empty() {
            return Err(AppError::Validation(EMPTY_ANSWER_MESSAGE.to_string()));
        }
        let question = self.current_question_or_conflict()?;
        Ok(AssessAnswerInput {
            question: question.question.clone(),
            user_answer: answer.to_string(),
            expected_answer: question.expected_answer.clone(),
            role: self.role_name_or_conflict()?.to_string(),
        })
    }

    pub fn record_assessment(
        &mut self,
        answer: String,
        assessment: AnswerAssessment,
    ) -> Result<(), AppError> {
        self.expect_view(&[View::Assessment], "record an assessment")?;
        self.last_answer = Some(answer);
        self.assessment = Some(assessment);
        self.set_view(View::Feedback);
        Ok(())
    }

    /// Only weak answers get a learning plan; the gaps become the weak areas.
    pub fn prepare_learning_plan(&self) -> Result<LearningPlanInput, AppError> {
        self.expect_view(&[View::Feedback], "request a learning plan")?;
        let assessment = self
            .assessment
            .as_ref()
            .ok_or_else(|| AppError::Conflict("There is no assessment yet".to_string()))?;
        if !assessment.is_weak() {
            return Err(AppError::Conflict(
                "A learning plan is only offered for scores below 70".to_string(),
            ));
        }

        let weak_areas = if assessment.gaps.trim().is_empty() {
            let question = self.current_question_or_conflict()?;
            format!(
                "The answer to \"{}\" scored {}/100.",
                question.question, assessment.score
            )
        } else {
            assessment.gaps.clone()
        };

        Ok(LearningPlanInput {
            role_name: self.role_name_or_conflict()?.to_string(),
            questions: self.questions().iter().map(|q| q.question.clone()).collect(),
            weak_areas,
        })
    }

    pub fn record_learning_plan(&mut self, plan: LearningPlan) -> Result<(), AppError> {
        self.expect_view(&[View::Feedback], "record a learning plan")?;
        self.learning_plan = Some(plan.learning_plan);
        self.set_view(View::Learning);
        Ok(())
    }

    pub fn next_question(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Feedback], "move to the next question")?;
        self.assessment = None;
        self.last_answer = None;
        self.learning_plan = None;
        if self.question_index + 1 < self.questions().len() {
            self.question_index += 1;
            self.set_view(View::Assessment);
        } else {
            self.set_view(View::Completed);
        }
        Ok(())
    }

    /// Back to the same question with a clean slate.
    pub fn try_again(&mut self) -> Result<(), AppError> {
        self.expect_view(&[View::Feedback, View::Learning], "try again")?;
        self.assessment = None;
        self.learning_plan = None;
        self.set_view(View::Assessment);
        Ok(())
    }

    pub fn start_over(&mut self) {
        self.bank = None;
        self.selected_role = None;
        self.question_index = 0;
        self.last_answer = None;
        self.assessment = None;
        self.learning_plan = None;
        self.set_view(View::Upload);
    }

    pub fn mcq_input(&self) -> Result<McqInput, AppError> {
        self.expect_view(&[View::Assessment], "generate a multiple-choice question")?;
        Ok(McqInput {
            question: self.current_question_or_conflict()?.question.clone(),
            role: self.role_name_or_conflict()?.to_string(),
        })
    }

    pub fn narration_input(&self) -> Result<NarrationInput, AppError> {
        self.expect_view(&[View::Assessment, View::Feedback], "narrate the question")?;
        Ok(NarrationInput {
            text: self.current_question_or_conflict()?.question.clone(),
        })
    }

    pub fn learning_path_input(&self) -> Result<LearningPathInput, AppError> {
        let role = self
            .role()
            .ok_or_else(|| AppError::Conflict("Select a role first".to_string()))?;
        let company = self
            .bank
            .as_ref()
            .map(|b| b.company.clone())
            .unwrap_or_default();
        Ok(LearningPathInput {
            role_name: role.name.clone(),
            company_name: company,
            questions: role.question_texts(),
        })
    }

    pub fn view(&self) -> SessionView {
        let roles = self
            .bank
            .as_ref()
            .map(|b| {
                b.roles
                    .iter()
                    .map(|r| RoleSummary {
                        name: r.name.clone(),
                        question_count: r.questions.len(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let has_question = matches!(self.view, View::Assessment | View::Feedback | View::Learning);

        SessionView {
            id: self.id,
            view: self.view,
            company: self.bank.as_ref().map(|b| b.company.clone()),
            roles,
            selected_role: self.selected_role.clone(),
            question_index: self.selected_role.as_ref().map(|_| self.question_index),
            total_questions: self.questions().len(),
            progress_percent: self.progress_percent(),
            current_question: if has_question {
                self.current_question().cloned()
            } else {
                None
            },
            last_answer: self.last_answer.clone(),
            assessment: self.assessment.clone(),
            can_request_learning_plan: self.can_request_learning_plan(),
            learning_plan: self.learning_plan.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
