use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Exam, ExamAssignment, ExamQuestion};
use crate::db::types::{AnswerType, Category};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) category: Category,
    #[serde(default)]
    pub(crate) question_count: Option<i32>,
    #[serde(default = "default_true")]
    pub(crate) study_enabled: bool,
    #[serde(default = "default_true")]
    pub(crate) test_enabled: bool,
    #[serde(default)]
    pub(crate) ai_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) question_count: Option<i32>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
    #[serde(default)]
    pub(crate) study_enabled: Option<bool>,
    #[serde(default)]
    pub(crate) test_enabled: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamQuestionCreate {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub(crate) prompt: String,
    #[serde(default = "default_answer_type")]
    pub(crate) answer_type: AnswerType,
    #[serde(default)]
    pub(crate) correct_answer: Option<String>,
    #[serde(default)]
    pub(crate) wrong1: Option<String>,
    #[serde(default)]
    pub(crate) wrong2: Option<String>,
    #[serde(default)]
    pub(crate) wrong3: Option<String>,
    #[serde(default)]
    pub(crate) reference_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateQuestionsRequest {
    #[serde(default)]
    pub(crate) count: Option<usize>,
    /// Replace existing exam questions instead of appending.
    #[serde(default)]
    pub(crate) replace: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentCreate {
    pub(crate) user_id: String,
    #[serde(default = "default_true")]
    pub(crate) can_study: bool,
    #[serde(default = "default_true")]
    pub(crate) can_test: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category: Category,
    pub(crate) question_count: i32,
    pub(crate) is_active: bool,
    pub(crate) study_enabled: bool,
    pub(crate) test_enabled: bool,
    pub(crate) created_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            description: exam.description,
            category: exam.category,
            question_count: exam.question_count,
            is_active: exam.is_active,
            study_enabled: exam.study_enabled,
            test_enabled: exam.test_enabled,
            created_at: format_primitive(exam.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamQuestionResponse {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) answer_type: AnswerType,
    pub(crate) correct_answer: Option<String>,
    pub(crate) wrong1: Option<String>,
    pub(crate) wrong2: Option<String>,
    pub(crate) wrong3: Option<String>,
    pub(crate) reference_answer: Option<String>,
    pub(crate) position: i32,
    pub(crate) ai_source: Option<String>,
}

impl ExamQuestionResponse {
    pub(crate) fn from_db(question: ExamQuestion) -> Self {
        Self {
            id: question.id,
            prompt: question.prompt,
            answer_type: question.answer_type,
            correct_answer: question.correct_answer,
            wrong1: question.wrong1,
            wrong2: question.wrong2,
            wrong3: question.wrong3,
            reference_answer: question.reference_answer,
            position: question.position,
            ai_source: question.ai_source,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateQuestionsResponse {
    pub(crate) source: String,
    pub(crate) questions: Vec<ExamQuestionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) user_id: String,
    pub(crate) can_study: bool,
    pub(crate) can_test: bool,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: ExamAssignment) -> Self {
        Self {
            id: assignment.id,
            exam_id: assignment.exam_id,
            user_id: assignment.user_id,
            can_study: assignment.can_study,
            can_test: assignment.can_test,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_answer_type() -> AnswerType {
    AnswerType::MultipleChoice
}
