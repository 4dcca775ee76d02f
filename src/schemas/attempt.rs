use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::Attempt;
use crate::db::types::{AssessmentMode, Category, SubjectKind};

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) subject_kind: SubjectKind,
    pub(crate) subject_title: String,
    pub(crate) category: Option<Category>,
    pub(crate) mode: AssessmentMode,
    pub(crate) score: i32,
    pub(crate) total: i32,
    pub(crate) created_at: String,
}

impl AttemptResponse {
    pub(crate) fn from_db(attempt: Attempt) -> Self {
        Self {
            id: attempt.id,
            user_id: attempt.user_id,
            subject_kind: attempt.subject_kind,
            subject_title: attempt.subject_title,
            category: attempt.category,
            mode: attempt.mode,
            score: attempt.score,
            total: attempt.total,
            created_at: format_primitive(attempt.created_at),
        }
    }
}

/// Full attempt view including the per-question answer log and, for test
/// runs, the AI progress note.
#[derive(Debug, Serialize)]
pub(crate) struct AttemptDetailResponse {
    #[serde(flatten)]
    pub(crate) summary: AttemptResponse,
    pub(crate) details: serde_json::Value,
    pub(crate) ai_summary: Option<String>,
}

impl AttemptDetailResponse {
    pub(crate) fn from_db(attempt: Attempt) -> Self {
        let details = attempt.details.0.clone();
        let ai_summary = attempt.ai_summary.clone();
        Self { summary: AttemptResponse::from_db(attempt), details, ai_summary }
    }
}
