use thiserror::Error;

use crate::db::types::Category;

/// Failures the assessment engine can report. All of these are recoverable at
/// the request boundary: each maps to a retryable next action rather than a
/// hard fault for the student.
#[derive(Debug, Error)]
pub(crate) enum EngineError {
    #[error("No questions available for {} yet. Please ask your teacher to add some.", .category.label())]
    NoQuestionsAvailable { category: Category },

    #[error(
        "This assessment needs {target} questions but only {available} are available \
         ({} more needed). Add more fixed questions or replenish the question bank.",
        target - available
    )]
    InsufficientQuestions { available: usize, target: usize },

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Session storage is unavailable: {0}")]
    SessionStore(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl EngineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_questions_names_the_shortfall() {
        let err = EngineError::InsufficientQuestions { available: 3, target: 5 };
        let message = err.to_string();
        assert!(message.contains("needs 5 questions"), "message: {message}");
        assert!(message.contains("only 3 are available"), "message: {message}");
        assert!(message.contains("2 more needed"), "message: {message}");
    }

    #[test]
    fn no_questions_message_mentions_category() {
        let err = EngineError::NoQuestionsAvailable { category: Category::Grammar };
        assert!(err.to_string().contains("Grammar"));
    }
}
