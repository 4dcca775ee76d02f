use serde::{Deserialize, Serialize};

use crate::db::models::{ExamQuestion, GrammarRow, TranslationRow, VocabularyRow};
use crate::db::types::{AnswerType, Category};

/// Where a question in an assembled set came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum QuestionSource {
    #[default]
    Bank,
    Exam,
}

/// Category-specific auxiliary fields carried alongside a question for later
/// review rendering. The reference hint is evaluator-internal and must never
/// be shown to the student before submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuestionMeta {
    #[serde(default)]
    pub(crate) source: QuestionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sentence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reference_hint: Option<String>,
}

/// Uniform view of one question inside a session, regardless of which table
/// or authoring path it came from.
///
/// Invariants: for multiple choice, `options` holds 2-4 unique non-empty
/// strings including `correct_answer`, freshly shuffled per presentation; for
/// free text, `options` is empty and `correct_answer` holds the reference
/// answer used only as an evaluator fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) answer_type: AnswerType,
    pub(crate) correct_answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    pub(crate) meta: QuestionMeta,
}

/// Raw stored record, one variant per category table.
#[derive(Debug, Clone)]
pub(crate) enum RawQuestion {
    Vocabulary(VocabularyRow),
    Grammar(GrammarRow),
    Translation(TranslationRow),
    /// Exam-authored question; MCQ or free text depending on its row.
    ExamSpecific(ExamQuestion),
}

impl RawQuestion {
    pub(crate) fn category(&self) -> Option<Category> {
        match self {
            Self::Vocabulary(_) => Some(Category::Vocabulary),
            Self::Grammar(_) => Some(Category::Grammar),
            Self::Translation(_) => Some(Category::Translation),
            Self::ExamSpecific(_) => None,
        }
    }
}

/// Outcome of answering one question. Owned by the session until the run
/// completes, then serialized into the attempt's `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AnswerOutcome {
    pub(crate) question: Question,
    pub(crate) selected: String,
    pub(crate) is_correct: bool,
    #[serde(default)]
    pub(crate) feedback: String,
    #[serde(default)]
    pub(crate) explanation: String,
}
