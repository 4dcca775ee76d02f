use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{GrammarRow, TranslationRow, VocabularyRow};

#[derive(Debug, Deserialize)]
pub(crate) struct VocabularyCreate {
    pub(crate) word: String,
    pub(crate) correct_answer: String,
    pub(crate) wrong1: String,
    pub(crate) wrong2: String,
    pub(crate) wrong3: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GrammarCreate {
    /// Sentence with `__` marking the blank.
    pub(crate) sentence: String,
    pub(crate) correct_answer: String,
    pub(crate) wrong1: String,
    pub(crate) wrong2: String,
    pub(crate) wrong3: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranslationCreate {
    pub(crate) prompt: String,
    pub(crate) reference_answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VocabularyResponse {
    pub(crate) id: String,
    pub(crate) word: String,
    pub(crate) correct_answer: String,
    pub(crate) wrong1: String,
    pub(crate) wrong2: String,
    pub(crate) wrong3: String,
    pub(crate) created_at: String,
}

impl VocabularyResponse {
    pub(crate) fn from_db(row: VocabularyRow) -> Self {
        Self {
            id: row.id,
            word: row.word,
            correct_answer: row.correct_answer,
            wrong1: row.wrong1,
            wrong2: row.wrong2,
            wrong3: row.wrong3,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GrammarResponse {
    pub(crate) id: String,
    pub(crate) sentence: String,
    pub(crate) correct_answer: String,
    pub(crate) wrong1: String,
    pub(crate) wrong2: String,
    pub(crate) wrong3: String,
    pub(crate) created_at: String,
}

impl GrammarResponse {
    pub(crate) fn from_db(row: GrammarRow) -> Self {
        Self {
            id: row.id,
            sentence: row.sentence_with_placeholder,
            correct_answer: row.correct_answer,
            wrong1: row.wrong1,
            wrong2: row.wrong2,
            wrong3: row.wrong3,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslationResponse {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) reference_answer: String,
    pub(crate) created_at: String,
}

impl TranslationResponse {
    pub(crate) fn from_db(row: TranslationRow) -> Self {
        Self {
            id: row.id,
            prompt: row.prompt,
            reference_answer: row.reference_answer,
            created_at: format_primitive(row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BankCounts {
    pub(crate) vocabulary: i64,
    pub(crate) grammar: i64,
    pub(crate) translation: i64,
}
