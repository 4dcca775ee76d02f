use serde::{Deserialize, Serialize};

use crate::db::types::{AnswerType, AssessmentMode, Category};
use crate::engine::question::Question;
use crate::engine::session::AssessmentSession;

/// Which content to start an assessment against.
#[derive(Debug, Deserialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub(crate) enum StartRequest {
    Quiz { category: Category, #[serde(default)] mode: Option<AssessmentMode> },
    Exam { exam_id: String, mode: AssessmentMode },
    StudyPack { pack_id: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) answer: Option<String>,
}

/// A question as shown to the student. Deliberately omits the correct
/// answer and reference hints; those only come back after submission.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) answer_type: AnswerType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) options: Vec<String>,
}

impl QuestionView {
    pub(crate) fn from_question(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            prompt: question.prompt.clone(),
            answer_type: question.answer_type,
            options: question.options.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) title: String,
    pub(crate) mode: AssessmentMode,
    /// 1-based position of the question currently shown.
    pub(crate) position: usize,
    pub(crate) total: usize,
    pub(crate) score: u32,
    pub(crate) question: Option<QuestionView>,
}

impl SessionView {
    pub(crate) fn from_session(session: &AssessmentSession) -> Self {
        Self {
            title: session.title.clone(),
            mode: session.mode,
            position: (session.current_index + 1).min(session.total()),
            total: session.total(),
            score: session.score,
            question: session.current_question().map(QuestionView::from_question),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerFeedback {
    pub(crate) is_correct: bool,
    pub(crate) correct_answer: String,
    pub(crate) feedback: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) explanation: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletedView {
    pub(crate) attempt_id: String,
    pub(crate) score: u32,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) answered: AnswerFeedback,
    /// Soft warning shown when the AI judge was unavailable and the local
    /// check decided the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) session: Option<SessionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completed: Option<CompletedView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::question::QuestionMeta;

    #[test]
    fn question_view_never_carries_the_answer() {
        let question = Question {
            id: "q-1".to_string(),
            prompt: "Pick one.".to_string(),
            answer_type: AnswerType::MultipleChoice,
            correct_answer: "secret".to_string(),
            options: vec!["secret".to_string(), "decoy".to_string()],
            meta: QuestionMeta { reference_hint: Some("secret".to_string()), ..Default::default() },
        };

        let view = QuestionView::from_question(&question);
        let payload = serde_json::to_string(&view).unwrap();

        assert!(!payload.contains("correct_answer"));
        assert!(!payload.contains("reference_hint"));
    }
}
