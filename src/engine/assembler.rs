use async_trait::async_trait;

use crate::db::types::Category;
use crate::engine::error::EngineError;
use crate::engine::question::Question;
use crate::engine::session::SubjectId;

/// Read access to the shared question bank.
#[async_trait]
pub(crate) trait QuestionBank: Send + Sync {
    /// Draw up to `count` normalized questions without replacement, uniformly
    /// at random. Fails with `NoQuestionsAvailable` when the category table
    /// is empty.
    async fn sample(&self, category: Category, count: usize) -> Result<Vec<Question>, EngineError>;

    /// Fetch specific questions by id, preserving the order of `ids` and
    /// silently skipping ids that no longer exist.
    async fn fetch_by_ids(
        &self,
        category: Category,
        ids: &[String],
    ) -> Result<Vec<Question>, EngineError>;
}

/// Everything the assembler needs to know about one quiz, exam, or study
/// pack instance.
#[derive(Debug, Clone)]
pub(crate) struct SubjectDescriptor {
    pub(crate) subject: SubjectId,
    pub(crate) title: String,
    pub(crate) category: Category,
    /// Questions explicitly authored for this subject, in display order.
    pub(crate) fixed: Vec<Question>,
    /// Exact number of questions the assembled set must contain.
    pub(crate) target_count: usize,
}

/// Build the ordered question set for one assessment instance: fixed
/// questions first, then general bank questions up to `target_count`.
///
/// Never returns a short list: the result has exactly `target_count`
/// questions or the call fails, so the recorded total always matches what
/// the student was promised.
pub(crate) async fn build(
    bank: &dyn QuestionBank,
    descriptor: &SubjectDescriptor,
) -> Result<Vec<Question>, EngineError> {
    let mut questions = descriptor.fixed.clone();
    if questions.len() > descriptor.target_count {
        questions.truncate(descriptor.target_count);
    }

    let needed = descriptor.target_count.saturating_sub(questions.len());
    if needed > 0 {
        let sampled = match bank.sample(descriptor.category, needed).await {
            Ok(sampled) => sampled,
            Err(EngineError::NoQuestionsAvailable { category }) => {
                if questions.is_empty() {
                    return Err(EngineError::NoQuestionsAvailable { category });
                }
                return Err(EngineError::InsufficientQuestions {
                    available: questions.len(),
                    target: descriptor.target_count,
                });
            }
            Err(err) => return Err(err),
        };
        questions.extend(sampled);
    }

    if questions.len() < descriptor.target_count {
        return Err(EngineError::InsufficientQuestions {
            available: questions.len(),
            target: descriptor.target_count,
        });
    }

    Ok(questions)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::db::types::AnswerType;
    use crate::engine::question::QuestionMeta;

    /// In-memory bank used across the engine tests.
    pub(crate) struct FakeBank {
        questions: HashMap<Category, Vec<Question>>,
    }

    impl FakeBank {
        pub(crate) fn new(category: Category, questions: Vec<Question>) -> Self {
            let mut map = HashMap::new();
            map.insert(category, questions);
            Self { questions: map }
        }

        pub(crate) fn empty() -> Self {
            Self { questions: HashMap::new() }
        }
    }

    #[async_trait]
    impl QuestionBank for FakeBank {
        async fn sample(
            &self,
            category: Category,
            count: usize,
        ) -> Result<Vec<Question>, EngineError> {
            let bank = self.questions.get(&category).filter(|bank| !bank.is_empty());
            let Some(bank) = bank else {
                return Err(EngineError::NoQuestionsAvailable { category });
            };
            Ok(bank.iter().take(count).cloned().collect())
        }

        async fn fetch_by_ids(
            &self,
            category: Category,
            ids: &[String],
        ) -> Result<Vec<Question>, EngineError> {
            let bank = self.questions.get(&category).cloned().unwrap_or_default();
            Ok(ids
                .iter()
                .filter_map(|id| bank.iter().find(|question| &question.id == id).cloned())
                .collect())
        }
    }

    pub(crate) fn mcq(id: &str, correct: &str, wrong: &str) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Question {id}"),
            answer_type: AnswerType::MultipleChoice,
            correct_answer: correct.to_string(),
            options: vec![correct.to_string(), wrong.to_string()],
            meta: QuestionMeta::default(),
        }
    }

    fn descriptor(fixed: Vec<Question>, target: usize) -> SubjectDescriptor {
        SubjectDescriptor {
            subject: SubjectId::Quiz { category: Category::Vocabulary },
            title: "Vocabulary".to_string(),
            category: Category::Vocabulary,
            fixed,
            target_count: target,
        }
    }

    #[tokio::test]
    async fn assembled_set_has_exactly_target_count() {
        let bank = FakeBank::new(
            Category::Vocabulary,
            (0..10).map(|i| mcq(&format!("b{i}"), "right", "wrong")).collect(),
        );
        let questions =
            build(&bank, &descriptor(vec![mcq("f1", "right", "wrong")], 5)).await.unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].id, "f1", "fixed questions come first, in order");
    }

    #[tokio::test]
    async fn empty_bank_and_no_fixed_questions_fails_with_no_questions() {
        let bank = FakeBank::empty();
        let err = build(&bank, &descriptor(Vec::new(), 5)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoQuestionsAvailable { category: Category::Vocabulary }
        ));
    }

    #[tokio::test]
    async fn shortfall_is_reported_not_silently_shrunk() {
        // 2 fixed + 1 general = 3 available, target 5 => 2 more needed.
        let bank = FakeBank::new(Category::Vocabulary, vec![mcq("b1", "right", "wrong")]);
        let fixed = vec![mcq("f1", "right", "wrong"), mcq("f2", "right", "wrong")];
        let err = build(&bank, &descriptor(fixed, 5)).await.unwrap_err();
        let message = err.to_string();
        match err {
            EngineError::InsufficientQuestions { available, target } => {
                assert_eq!(available, 3);
                assert_eq!(target, 5);
                assert!(message.contains("2 more needed"), "message: {message}");
            }
            other => panic!("expected InsufficientQuestions, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_bank_with_fixed_questions_reports_shortfall() {
        let bank = FakeBank::empty();
        let fixed = vec![mcq("f1", "right", "wrong")];
        let err = build(&bank, &descriptor(fixed, 3)).await.unwrap_err();
        assert!(matches!(err, EngineError::InsufficientQuestions { available: 1, target: 3 }));
    }

    #[tokio::test]
    async fn surplus_fixed_questions_are_truncated_to_target() {
        let bank = FakeBank::empty();
        let fixed = (0..4).map(|i| mcq(&format!("f{i}"), "right", "wrong")).collect();
        let questions = build(&bank, &descriptor(fixed, 3)).await.unwrap();
        assert_eq!(questions.len(), 3);
    }
}
