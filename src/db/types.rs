use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Question bank categories. Each category owns its own table and raw record
/// shape; stored values are the snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub(crate) enum Category {
    Vocabulary,
    Grammar,
    Translation,
}

impl Category {
    pub(crate) const ALL: [Category; 3] =
        [Category::Vocabulary, Category::Grammar, Category::Translation];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Vocabulary => "vocabulary",
            Self::Grammar => "grammar",
            Self::Translation => "translation",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Vocabulary => "Vocabulary",
            Self::Grammar => "Grammar",
            Self::Translation => "Translation",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Vocabulary => "questions_vocabulary",
            Self::Grammar => "questions_grammar",
            Self::Translation => "questions_translation",
        }
    }

    pub(crate) fn answer_type(self) -> AnswerType {
        match self {
            Self::Vocabulary | Self::Grammar => AnswerType::MultipleChoice,
            Self::Translation => AnswerType::FreeText,
        }
    }
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "vocabulary" => Ok(Self::Vocabulary),
            "grammar" => Ok(Self::Grammar),
            "translation" => Ok(Self::Translation),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub(crate) enum AnswerType {
    MultipleChoice,
    FreeText,
}

/// How an assessment run is scored and reported. Quizzes and study packs are
/// always practice; exams run in study or test mode. Teacher summaries are
/// produced for test attempts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub(crate) enum AssessmentMode {
    Practice,
    Study,
    Test,
}

impl AssessmentMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Practice => "practice",
            Self::Study => "study",
            Self::Test => "test",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub(crate) enum SubjectKind {
    Quiz,
    Exam,
    StudyPack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Teacher,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn translation_is_free_text() {
        assert_eq!(Category::Translation.answer_type(), AnswerType::FreeText);
        assert_eq!(Category::Vocabulary.answer_type(), AnswerType::MultipleChoice);
        assert_eq!(Category::Grammar.answer_type(), AnswerType::MultipleChoice);
    }
}
