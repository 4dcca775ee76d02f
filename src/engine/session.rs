use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::types::{AssessmentMode, AnswerType, Category, SubjectKind};
use crate::engine::assembler::{self, QuestionBank, SubjectDescriptor};
use crate::engine::error::EngineError;
use crate::engine::evaluator::{self, TextJudge};
use crate::engine::question::{AnswerOutcome, Question};
use crate::engine::store::SessionStore;

/// Identifies which quiz, exam, or study pack a session runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum SubjectId {
    Quiz { category: Category },
    Exam { exam_id: String },
    StudyPack { pack_id: String },
}

impl SubjectId {
    pub(crate) fn kind(&self) -> SubjectKind {
        match self {
            Self::Quiz { .. } => SubjectKind::Quiz,
            Self::Exam { .. } => SubjectKind::Exam,
            Self::StudyPack { .. } => SubjectKind::StudyPack,
        }
    }
}

/// One user's in-progress assessment. The question list is fixed at start;
/// the cursor, score, and answer log advance together on every submission.
///
/// Invariants: `current_index <= questions.len()`, `score <= current_index`,
/// `answers.len() == current_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct AssessmentSession {
    pub(crate) subject: SubjectId,
    pub(crate) title: String,
    pub(crate) category: Category,
    pub(crate) mode: AssessmentMode,
    pub(crate) questions: Vec<Question>,
    pub(crate) current_index: usize,
    pub(crate) score: u32,
    pub(crate) answers: Vec<AnswerOutcome>,
}

impl AssessmentSession {
    pub(crate) fn total(&self) -> usize {
        self.questions.len()
    }

    pub(crate) fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.current_index >= self.questions.len()
    }
}

/// Payload handed to the recorder when a session completes.
#[derive(Debug)]
pub(crate) struct NewAttempt<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) subject: &'a SubjectId,
    pub(crate) subject_title: &'a str,
    pub(crate) category: Category,
    pub(crate) mode: AssessmentMode,
    pub(crate) score: u32,
    pub(crate) total: usize,
    pub(crate) answers: &'a [AnswerOutcome],
    pub(crate) ai_summary: Option<String>,
}

/// Persists one immutable attempt row per completed session and returns its
/// identifier. Called exactly once per session lifecycle, enforced by the
/// single transition out of `InProgress` below.
#[async_trait]
pub(crate) trait AttemptRecorder: Send + Sync {
    async fn record(&self, attempt: NewAttempt<'_>) -> Result<String, EngineError>;
}

/// Produces a short teacher-facing summary of a finished run, or `None` when
/// the summarizer is unavailable. Failure never blocks attempt recording.
#[async_trait]
pub(crate) trait AttemptSummarizer: Send + Sync {
    async fn summarize(&self, subject_title: &str, answers: &[AnswerOutcome]) -> Option<String>;
}

/// What a submission produced.
#[derive(Debug)]
pub(crate) enum SubmitOutcome {
    /// More questions remain; the updated session carries the next one.
    InProgress { session: AssessmentSession, answered: AnswerOutcome, judge_degraded: bool },
    /// The run finished and was recorded.
    Completed {
        attempt_id: String,
        answered: AnswerOutcome,
        score: u32,
        total: usize,
        judge_degraded: bool,
    },
}

pub(crate) fn session_key(user_id: &str) -> String {
    format!("assessment:{user_id}")
}

/// The per-user assessment state machine: `Absent -> InProgress ->
/// Completed`. One session per user; starting a different subject or mode
/// discards the old run without recording it.
pub(crate) struct SessionEngine<'a> {
    store: &'a dyn SessionStore,
    bank: &'a dyn QuestionBank,
    judge: &'a dyn TextJudge,
    summarizer: &'a dyn AttemptSummarizer,
    recorder: &'a dyn AttemptRecorder,
}

impl<'a> SessionEngine<'a> {
    pub(crate) fn new(
        store: &'a dyn SessionStore,
        bank: &'a dyn QuestionBank,
        judge: &'a dyn TextJudge,
        summarizer: &'a dyn AttemptSummarizer,
        recorder: &'a dyn AttemptRecorder,
    ) -> Self {
        Self { store, bank, judge, summarizer, recorder }
    }

    /// Resume the matching session or assemble a fresh one. A session for a
    /// different subject or mode is dropped on the spot, unrecorded.
    pub(crate) async fn start(
        &self,
        user_id: &str,
        descriptor: SubjectDescriptor,
        mode: AssessmentMode,
    ) -> Result<AssessmentSession, EngineError> {
        let key = session_key(user_id);

        if let Some(existing) = self.store.load(&key).await? {
            if existing.subject == descriptor.subject && existing.mode == mode {
                return Ok(existing);
            }
            self.store.clear(&key).await?;
        }

        let questions = assembler::build(self.bank, &descriptor).await?;
        let session = AssessmentSession {
            subject: descriptor.subject,
            title: descriptor.title,
            category: descriptor.category,
            mode,
            questions,
            current_index: 0,
            score: 0,
            answers: Vec::new(),
        };
        self.store.save(&key, &session).await?;
        Ok(session)
    }

    /// The in-progress session, if any.
    pub(crate) async fn current(
        &self,
        user_id: &str,
    ) -> Result<Option<AssessmentSession>, EngineError> {
        self.store.load(&session_key(user_id)).await
    }

    /// Drop any in-progress session without recording it.
    pub(crate) async fn abandon(&self, user_id: &str) -> Result<(), EngineError> {
        self.store.clear(&session_key(user_id)).await
    }

    /// Evaluate one answer and advance the cursor. On the final question the
    /// attempt is recorded synchronously, the session is cleared, and the new
    /// attempt id is returned.
    pub(crate) async fn submit(
        &self,
        user_id: &str,
        submitted: Option<&str>,
    ) -> Result<SubmitOutcome, EngineError> {
        let key = session_key(user_id);
        let Some(mut session) = self.store.load(&key).await? else {
            return Err(EngineError::validation(
                "No assessment in progress. Start one before submitting answers.",
            ));
        };
        let Some(question) = session.current_question().cloned() else {
            // A finished session is cleared on completion, so this only
            // happens if a stale payload slipped through.
            self.store.clear(&key).await?;
            return Err(EngineError::validation(
                "No assessment in progress. Start one before submitting answers.",
            ));
        };

        let selected = match question.answer_type {
            AnswerType::MultipleChoice => {
                let choice = submitted.map(str::trim).unwrap_or_default();
                if choice.is_empty() {
                    // Do not advance; the student must resubmit.
                    return Err(EngineError::validation("Please pick an option to continue."));
                }
                choice.to_string()
            }
            AnswerType::FreeText => submitted.unwrap_or_default().trim().to_string(),
        };

        let evaluation = evaluator::evaluate(self.judge, &question, &selected).await;
        let outcome = AnswerOutcome {
            question,
            selected,
            is_correct: evaluation.is_correct,
            feedback: evaluation.feedback,
            explanation: evaluation.explanation,
        };

        session.answers.push(outcome.clone());
        if outcome.is_correct {
            session.score += 1;
        }
        session.current_index += 1;

        if !session.is_finished() {
            self.store.save(&key, &session).await?;
            return Ok(SubmitOutcome::InProgress {
                session,
                answered: outcome,
                judge_degraded: evaluation.judge_degraded,
            });
        }

        let ai_summary = if session.mode == AssessmentMode::Test {
            self.summarizer.summarize(&session.title, &session.answers).await
        } else {
            None
        };

        let attempt_id = self
            .recorder
            .record(NewAttempt {
                user_id,
                subject: &session.subject,
                subject_title: &session.title,
                category: session.category,
                mode: session.mode,
                score: session.score,
                total: session.total(),
                answers: &session.answers,
                ai_summary,
            })
            .await?;

        self.store.clear(&key).await?;

        Ok(SubmitOutcome::Completed {
            attempt_id,
            answered: outcome,
            score: session.score,
            total: session.total(),
            judge_degraded: evaluation.judge_degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::engine::assembler::tests::{mcq, FakeBank};
    use crate::engine::evaluator::tests::{free_text_question, FakeJudge};
    use crate::engine::store::InMemorySessionStore;

    struct RecordingSink {
        calls: AtomicUsize,
        last: Mutex<Option<(String, u32, usize, Option<String>)>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), last: Mutex::new(None) }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AttemptRecorder for RecordingSink {
        async fn record(&self, attempt: NewAttempt<'_>) -> Result<String, EngineError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((
                attempt.user_id.to_string(),
                attempt.score,
                attempt.total,
                attempt.ai_summary.clone(),
            ));
            Ok(format!("attempt-{n}"))
        }
    }

    struct ScriptedSummarizer {
        summary: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedSummarizer {
        fn none() -> Self {
            Self { summary: None, calls: AtomicUsize::new(0) }
        }

        fn of(text: &str) -> Self {
            Self { summary: Some(text.to_string()), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl AttemptSummarizer for ScriptedSummarizer {
        async fn summarize(&self, _: &str, _: &[AnswerOutcome]) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.summary.clone()
        }
    }

    struct Fixture {
        store: InMemorySessionStore,
        bank: FakeBank,
        judge: FakeJudge,
        summarizer: ScriptedSummarizer,
        recorder: RecordingSink,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: InMemorySessionStore::new(),
                bank: FakeBank::new(
                    Category::Vocabulary,
                    (0..10).map(|i| mcq(&format!("b{i}"), "right", "wrong")).collect(),
                ),
                judge: FakeJudge::unavailable(),
                summarizer: ScriptedSummarizer::none(),
                recorder: RecordingSink::new(),
            }
        }

        fn engine(&self) -> SessionEngine<'_> {
            SessionEngine::new(
                &self.store,
                &self.bank,
                &self.judge,
                &self.summarizer,
                &self.recorder,
            )
        }

        fn quiz_descriptor(&self, target: usize) -> SubjectDescriptor {
            SubjectDescriptor {
                subject: SubjectId::Quiz { category: Category::Vocabulary },
                title: "Vocabulary".to_string(),
                category: Category::Vocabulary,
                fixed: Vec::new(),
                target_count: target,
            }
        }
    }

    #[tokio::test]
    async fn start_creates_a_fresh_session() {
        let fx = Fixture::new();
        let session = fx.engine().start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice)
            .await
            .unwrap();

        assert_eq!(session.current_index, 0);
        assert_eq!(session.score, 0);
        assert!(session.answers.is_empty());
        assert_eq!(session.total(), 3);
    }

    #[tokio::test]
    async fn start_resumes_matching_session() {
        let fx = Fixture::new();
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice).await.unwrap();
        engine.submit("user-1", Some("right")).await.unwrap();

        let resumed =
            engine.start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice).await.unwrap();
        assert_eq!(resumed.current_index, 1, "progress survives a matching restart");
    }

    #[tokio::test]
    async fn switching_subjects_discards_without_recording() {
        let fx = Fixture::new();
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice).await.unwrap();
        engine.submit("user-1", Some("right")).await.unwrap();

        let other = SubjectDescriptor {
            subject: SubjectId::Exam { exam_id: "exam-7".to_string() },
            title: "Midterm".to_string(),
            category: Category::Vocabulary,
            fixed: Vec::new(),
            target_count: 2,
        };
        let session = engine.start("user-1", other, AssessmentMode::Test).await.unwrap();

        assert_eq!(session.current_index, 0);
        assert!(matches!(session.subject, SubjectId::Exam { .. }));
        assert_eq!(fx.recorder.call_count(), 0, "abandoned run is never recorded");
    }

    #[tokio::test]
    async fn each_submission_advances_by_exactly_one() {
        let fx = Fixture::new();
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice).await.unwrap();

        let answers = ["right", "wrong", "right"];
        for (i, answer) in answers.iter().enumerate() {
            let before = engine.current("user-1").await.unwrap();
            let before_score = before.as_ref().map(|s| s.score).unwrap_or(0);
            let outcome = engine.submit("user-1", Some(answer)).await.unwrap();
            match outcome {
                SubmitOutcome::InProgress { session, .. } => {
                    assert_eq!(session.current_index, i + 1);
                    assert_eq!(session.answers.len(), session.current_index);
                    assert!(session.score == before_score || session.score == before_score + 1);
                }
                SubmitOutcome::Completed { score, total, .. } => {
                    assert_eq!(i, 2);
                    assert_eq!(total, 3);
                    assert_eq!(score, 2);
                }
            }
        }
    }

    #[tokio::test]
    async fn missing_mcq_choice_is_rejected_without_advancing() {
        let fx = Fixture::new();
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice).await.unwrap();

        let err = engine.submit("user-1", None).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        let err = engine.submit("user-1", Some("  ")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let session = engine.current("user-1").await.unwrap().unwrap();
        assert_eq!(session.current_index, 0, "rejected submissions do not advance");
        assert!(session.answers.is_empty());
    }

    #[tokio::test]
    async fn empty_free_text_is_accepted_and_scored_incorrect() {
        let fx = Fixture {
            bank: FakeBank::new(
                Category::Translation,
                vec![free_text_question("I learn new words every day.")],
            ),
            ..Fixture::new()
        };
        let engine = fx.engine();
        let descriptor = SubjectDescriptor {
            subject: SubjectId::Quiz { category: Category::Translation },
            title: "Translation".to_string(),
            category: Category::Translation,
            fixed: Vec::new(),
            target_count: 1,
        };
        engine.start("user-1", descriptor, AssessmentMode::Practice).await.unwrap();

        let outcome = engine.submit("user-1", Some("")).await.unwrap();
        match outcome {
            SubmitOutcome::Completed { score, answered, .. } => {
                assert_eq!(score, 0);
                assert!(!answered.is_correct);
                assert_eq!(answered.feedback, "No answer submitted.");
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(fx.judge.call_count(), 0);
    }

    #[tokio::test]
    async fn completion_records_exactly_once_and_clears_the_session() {
        let fx = Fixture::new();
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(2), AssessmentMode::Practice).await.unwrap();

        engine.submit("user-1", Some("right")).await.unwrap();
        assert_eq!(fx.recorder.call_count(), 0, "never records before the final question");

        let outcome = engine.submit("user-1", Some("right")).await.unwrap();
        let SubmitOutcome::Completed { attempt_id, score, total, .. } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(attempt_id, "attempt-0");
        assert_eq!((score, total), (2, 2));
        assert_eq!(fx.recorder.call_count(), 1);
        assert!(engine.current("user-1").await.unwrap().is_none(), "session cleared");

        // A further submission is a caller error, not a second recording.
        let err = engine.submit("user-1", Some("right")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(fx.recorder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mode_attaches_summary_when_available() {
        let fx = Fixture {
            summarizer: ScriptedSummarizer::of("Solid vocabulary recall."),
            ..Fixture::new()
        };
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(1), AssessmentMode::Test).await.unwrap();
        engine.submit("user-1", Some("right")).await.unwrap();

        let last = fx.recorder.last.lock().unwrap().clone();
        let (_, _, _, summary) = last.unwrap();
        assert_eq!(summary.as_deref(), Some("Solid vocabulary recall."));
    }

    #[tokio::test]
    async fn practice_mode_skips_the_summarizer() {
        let fx = Fixture { summarizer: ScriptedSummarizer::of("unused"), ..Fixture::new() };
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(1), AssessmentMode::Practice).await.unwrap();
        engine.submit("user-1", Some("right")).await.unwrap();

        assert_eq!(fx.summarizer.calls.load(Ordering::SeqCst), 0);
        let last = fx.recorder.last.lock().unwrap().clone();
        assert_eq!(last.unwrap().3, None);
    }

    #[tokio::test]
    async fn summarizer_failure_never_blocks_recording() {
        let fx = Fixture::new(); // summarizer returns None
        let engine = fx.engine();
        engine.start("user-1", fx.quiz_descriptor(1), AssessmentMode::Test).await.unwrap();
        let outcome = engine.submit("user-1", Some("right")).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        assert_eq!(fx.recorder.call_count(), 1);
        let last = fx.recorder.last.lock().unwrap().clone();
        assert_eq!(last.unwrap().3, None, "attempt recorded with no summary");
    }

    #[tokio::test]
    async fn submitting_without_a_session_is_a_caller_error() {
        let fx = Fixture::new();
        let err = fx.engine().submit("user-1", Some("right")).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn sessions_round_trip_through_json() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let session =
            engine.start("user-1", fx.quiz_descriptor(3), AssessmentMode::Practice).await.unwrap();

        let payload = serde_json::to_string(&session).unwrap();
        let restored: AssessmentSession = serde_json::from_str(&payload).unwrap();
        assert_eq!(restored, session);
    }
}
