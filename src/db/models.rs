use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AnswerType, AssessmentMode, Category, SubjectKind, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl User {
    pub(crate) fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct VocabularyRow {
    pub(crate) id: String,
    pub(crate) word: String,
    pub(crate) correct_answer: String,
    pub(crate) wrong1: String,
    pub(crate) wrong2: String,
    pub(crate) wrong3: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct GrammarRow {
    pub(crate) id: String,
    pub(crate) sentence_with_placeholder: String,
    pub(crate) correct_answer: String,
    pub(crate) wrong1: String,
    pub(crate) wrong2: String,
    pub(crate) wrong3: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TranslationRow {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) reference_answer: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) category: Category,
    pub(crate) question_count: i32,
    pub(crate) is_active: bool,
    pub(crate) study_enabled: bool,
    pub(crate) test_enabled: bool,
    pub(crate) ai_prompt: Option<String>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// A question authored for one specific exam rather than drawn from the bank.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamQuestion {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) prompt: String,
    pub(crate) answer_type: AnswerType,
    pub(crate) correct_answer: Option<String>,
    pub(crate) wrong1: Option<String>,
    pub(crate) wrong2: Option<String>,
    pub(crate) wrong3: Option<String>,
    pub(crate) reference_answer: Option<String>,
    pub(crate) position: i32,
    pub(crate) ai_source: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamAssignment {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) user_id: String,
    pub(crate) can_study: bool,
    pub(crate) can_test: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudyPack {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) description: Option<String>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Reference from a study pack to a bank question, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudyPackQuestion {
    pub(crate) id: String,
    pub(crate) pack_id: String,
    pub(crate) category: Category,
    pub(crate) question_id: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudyPackAssignment {
    pub(crate) id: String,
    pub(crate) pack_id: String,
    pub(crate) user_id: String,
    pub(crate) can_view: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Durable record of one completed assessment run. Written exactly once when
/// a session finishes and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Attempt {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) subject_kind: SubjectKind,
    pub(crate) subject_title: String,
    pub(crate) category: Option<Category>,
    pub(crate) exam_id: Option<String>,
    pub(crate) study_pack_id: Option<String>,
    pub(crate) mode: AssessmentMode,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) details: Json<serde_json::Value>,
    pub(crate) ai_summary: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}
