use async_trait::async_trait;

use crate::db::types::AnswerType;
use crate::engine::question::Question;

/// Structured verdict from the external free-text judge.
#[derive(Debug, Clone)]
pub(crate) struct Verdict {
    pub(crate) is_correct: bool,
    pub(crate) feedback: String,
    pub(crate) explanation: String,
}

/// External collaborator that judges free-text answers semantically.
#[async_trait]
pub(crate) trait TextJudge: Send + Sync {
    async fn judge(
        &self,
        prompt: &str,
        reference: &str,
        submission: &str,
    ) -> anyhow::Result<Verdict>;
}

/// Result of evaluating one submitted answer. `judge_degraded` is set when
/// the external judge was needed but unavailable and the local fallback
/// verdict stands; it surfaces as a soft notice, never a hard error.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub(crate) is_correct: bool,
    pub(crate) feedback: String,
    pub(crate) explanation: String,
    pub(crate) judge_degraded: bool,
}

/// Judge a submitted answer against a question: exact string match for
/// multiple choice, external-judge-with-fallback for free text.
pub(crate) async fn evaluate(
    judge: &dyn TextJudge,
    question: &Question,
    submitted: &str,
) -> Evaluation {
    match question.answer_type {
        AnswerType::MultipleChoice => Evaluation {
            is_correct: submitted == question.correct_answer,
            feedback: String::new(),
            explanation: String::new(),
            judge_degraded: false,
        },
        AnswerType::FreeText => evaluate_free_text(judge, question, submitted).await,
    }
}

async fn evaluate_free_text(
    judge: &dyn TextJudge,
    question: &Question,
    submitted: &str,
) -> Evaluation {
    let submitted = submitted.trim();
    let reference = question.correct_answer.trim();

    if submitted.is_empty() {
        return Evaluation {
            is_correct: false,
            feedback: "No answer submitted.".to_string(),
            explanation: "Please provide a response so we can review it.".to_string(),
            judge_degraded: false,
        };
    }

    let fallback_correct = submitted.eq_ignore_ascii_case(reference);
    let fallback = Evaluation {
        is_correct: fallback_correct,
        feedback: if fallback_correct {
            "Looks good! Keep it up.".to_string()
        } else {
            format!("Expected: {reference}")
        },
        explanation: String::new(),
        judge_degraded: false,
    };

    match judge.judge(&question.prompt, reference, submitted).await {
        Ok(verdict) => Evaluation {
            is_correct: verdict.is_correct,
            feedback: if verdict.feedback.is_empty() { fallback.feedback } else { verdict.feedback },
            explanation: verdict.explanation,
            judge_degraded: false,
        },
        Err(err) => {
            tracing::warn!(error = %err, "Free-text judge unavailable, using local fallback");
            Evaluation { judge_degraded: true, ..fallback }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::engine::question::QuestionMeta;

    /// Scripted judge that counts invocations.
    pub(crate) struct FakeJudge {
        verdict: Option<Verdict>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeJudge {
        pub(crate) fn unavailable() -> Self {
            Self { verdict: None, calls: AtomicUsize::new(0) }
        }

        pub(crate) fn returning(verdict: Verdict) -> Self {
            Self { verdict: Some(verdict), calls: AtomicUsize::new(0) }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextJudge for FakeJudge {
        async fn judge(&self, _: &str, _: &str, _: &str) -> anyhow::Result<Verdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.verdict {
                Some(verdict) => Ok(verdict.clone()),
                None => Err(anyhow::anyhow!("judge timed out")),
            }
        }
    }

    fn mcq_question(correct: &str) -> Question {
        Question {
            id: "q-1".to_string(),
            prompt: "Pick one.".to_string(),
            answer_type: AnswerType::MultipleChoice,
            correct_answer: correct.to_string(),
            options: vec![correct.to_string(), "finishing".to_string()],
            meta: QuestionMeta::default(),
        }
    }

    pub(crate) fn free_text_question(reference: &str) -> Question {
        Question {
            id: "t-1".to_string(),
            prompt: "Translate the sentence.".to_string(),
            answer_type: AnswerType::FreeText,
            correct_answer: reference.to_string(),
            options: Vec::new(),
            meta: QuestionMeta::default(),
        }
    }

    #[tokio::test]
    async fn multiple_choice_is_exact_string_equality() {
        let judge = FakeJudge::unavailable();
        let question = mcq_question("had finished");

        let hit = evaluate(&judge, &question, "had finished").await;
        assert!(hit.is_correct);

        let miss = evaluate(&judge, &question, "finishing").await;
        assert!(!miss.is_correct);

        assert_eq!(judge.call_count(), 0, "MCQ never consults the judge");
    }

    #[tokio::test]
    async fn empty_free_text_short_circuits_without_judge_call() {
        let judge = FakeJudge::unavailable();
        let question = free_text_question("I learn new words every day.");

        let evaluation = evaluate(&judge, &question, "   ").await;

        assert!(!evaluation.is_correct);
        assert_eq!(evaluation.feedback, "No answer submitted.");
        assert!(!evaluation.judge_degraded);
        assert_eq!(judge.call_count(), 0);
    }

    #[tokio::test]
    async fn judge_failure_falls_back_to_case_insensitive_match() {
        let judge = FakeJudge::unavailable();
        let question = free_text_question("I learn new words every day.");

        let evaluation = evaluate(&judge, &question, "i learn new words every day.").await;

        assert!(evaluation.is_correct);
        assert_eq!(evaluation.feedback, "Looks good! Keep it up.");
        assert!(evaluation.judge_degraded);
        assert_eq!(judge.call_count(), 1);
    }

    #[tokio::test]
    async fn judge_failure_with_wrong_answer_names_the_reference() {
        let judge = FakeJudge::unavailable();
        let question = free_text_question("I learn new words every day.");

        let evaluation = evaluate(&judge, &question, "Every day words.").await;

        assert!(!evaluation.is_correct);
        assert_eq!(evaluation.feedback, "Expected: I learn new words every day.");
        assert!(evaluation.judge_degraded);
    }

    #[tokio::test]
    async fn judge_verdict_replaces_the_fallback_entirely() {
        let judge = FakeJudge::returning(Verdict {
            is_correct: true,
            feedback: "Natural phrasing.".to_string(),
            explanation: "Meaning matches the reference.".to_string(),
        });
        let question = free_text_question("I learn new words every day.");

        // Fallback alone would call this wrong; the judge verdict wins.
        let evaluation = evaluate(&judge, &question, "Each day I pick up new vocabulary.").await;

        assert!(evaluation.is_correct);
        assert_eq!(evaluation.feedback, "Natural phrasing.");
        assert_eq!(evaluation.explanation, "Meaning matches the reference.");
        assert!(!evaluation.judge_degraded);
    }
}
