use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{StudyPack, StudyPackQuestion};
use crate::db::types::Category;

#[derive(Debug, Deserialize)]
pub(crate) struct StudyPackCreate {
    pub(crate) name: String,
    pub(crate) category: Category,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PackQuestionAdd {
    pub(crate) question_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PackAssignmentCreate {
    pub(crate) user_id: String,
    #[serde(default = "default_true")]
    pub(crate) can_view: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudyPackResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) description: Option<String>,
    pub(crate) question_count: usize,
    pub(crate) created_at: String,
}

impl StudyPackResponse {
    pub(crate) fn from_db(pack: StudyPack, question_count: usize) -> Self {
        Self {
            id: pack.id,
            name: pack.name,
            category: pack.category,
            description: pack.description,
            question_count,
            created_at: format_primitive(pack.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PackQuestionResponse {
    pub(crate) question_id: String,
    pub(crate) category: Category,
}

impl PackQuestionResponse {
    pub(crate) fn from_db(question: StudyPackQuestion) -> Self {
        Self { question_id: question.question_id, category: question.category }
    }
}

fn default_true() -> bool {
    true
}
