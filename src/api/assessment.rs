use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::exams::{exam_access_for, fetch_exam};
use crate::api::guards::CurrentUser;
use crate::api::study_packs::{fetch_pack, pack_visible_to};
use crate::core::state::AppState;
use crate::db::types::AssessmentMode;
use crate::engine::assembler::{QuestionBank, SubjectDescriptor};
use crate::engine::evaluator::TextJudge;
use crate::engine::normalizer;
use crate::engine::question::{AnswerOutcome, RawQuestion};
use crate::engine::session::{SessionEngine, SubjectId, SubmitOutcome};
use crate::engine::store::RedisSessionStore;
use crate::repositories::attempts::SqlAttemptRecorder;
use crate::repositories::exams;
use crate::repositories::question_bank::SqlQuestionBank;
use crate::schemas::assessment::{
    AnswerFeedback, CompletedView, SessionView, StartRequest, SubmitRequest, SubmitResponse,
};
use crate::services::judge::{AiJudge, OfflineJudge};
use crate::services::summarizer::AiSummarizer;

const JUDGE_DEGRADED_NOTICE: &str =
    "AI review was unavailable; the answer was checked automatically.";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start))
        .route("/", get(current))
        .route("/", delete(abandon))
        .route("/answers", post(submit))
}

/// The engine's collaborators, borrowed from application state for the
/// duration of one request.
struct EngineParts<'a> {
    store: RedisSessionStore<'a>,
    bank: SqlQuestionBank<'a>,
    ai_judge: Option<AiJudge<'a>>,
    offline_judge: OfflineJudge,
    summarizer: AiSummarizer<'a>,
    recorder: SqlAttemptRecorder<'a>,
}

impl<'a> EngineParts<'a> {
    fn new(state: &'a AppState) -> Self {
        Self {
            store: RedisSessionStore::new(state.redis()),
            bank: SqlQuestionBank::new(state.db()),
            ai_judge: state.ai().map(AiJudge::new),
            offline_judge: OfflineJudge,
            summarizer: AiSummarizer::new(state.ai()),
            recorder: SqlAttemptRecorder::new(state.db()),
        }
    }

    fn engine(&self) -> SessionEngine<'_> {
        let judge: &dyn TextJudge = match &self.ai_judge {
            Some(judge) => judge,
            None => &self.offline_judge,
        };
        SessionEngine::new(&self.store, &self.bank, judge, &self.summarizer, &self.recorder)
    }
}

async fn start(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<StartRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let (descriptor, mode) = resolve_subject(&state, &user, payload).await?;

    let parts = EngineParts::new(&state);
    let session = parts.engine().start(&user.id, descriptor, mode).await?;

    Ok((StatusCode::CREATED, Json(SessionView::from_session(&session))))
}

async fn current(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SessionView>, ApiError> {
    let parts = EngineParts::new(&state);
    let session = parts
        .engine()
        .current(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No assessment in progress".to_string()))?;

    Ok(Json(SessionView::from_session(&session)))
}

async fn abandon(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    let parts = EngineParts::new(&state);
    parts.engine().abandon(&user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let parts = EngineParts::new(&state);
    let outcome = parts.engine().submit(&user.id, payload.answer.as_deref()).await?;

    let response = match outcome {
        SubmitOutcome::InProgress { session, answered, judge_degraded } => SubmitResponse {
            answered: feedback_for(&answered),
            notice: degraded_notice(judge_degraded),
            session: Some(SessionView::from_session(&session)),
            completed: None,
        },
        SubmitOutcome::Completed { attempt_id, answered, score, total, judge_degraded } => {
            SubmitResponse {
                answered: feedback_for(&answered),
                notice: degraded_notice(judge_degraded),
                session: None,
                completed: Some(CompletedView { attempt_id, score, total }),
            }
        }
    };

    Ok(Json(response))
}

fn feedback_for(outcome: &AnswerOutcome) -> AnswerFeedback {
    AnswerFeedback {
        is_correct: outcome.is_correct,
        correct_answer: outcome.question.correct_answer.clone(),
        feedback: outcome.feedback.clone(),
        explanation: outcome.explanation.clone(),
    }
}

fn degraded_notice(judge_degraded: bool) -> Option<String> {
    judge_degraded.then(|| JUDGE_DEGRADED_NOTICE.to_string())
}

/// Turn a start request into an assembled subject, applying the access rules
/// for the content it targets.
async fn resolve_subject(
    state: &AppState,
    user: &crate::db::models::User,
    request: StartRequest,
) -> Result<(SubjectDescriptor, AssessmentMode), ApiError> {
    match request {
        StartRequest::Quiz { category, mode } => {
            let descriptor = SubjectDescriptor {
                subject: SubjectId::Quiz { category },
                title: category.label().to_string(),
                category,
                fixed: Vec::new(),
                target_count: state.settings().assessment().default_question_count,
            };
            Ok((descriptor, mode.unwrap_or(AssessmentMode::Practice)))
        }
        StartRequest::Exam { exam_id, mode } => {
            let exam = fetch_exam(state, &exam_id).await?;
            let access = exam_access_for(state, &exam, user).await?;

            match mode {
                AssessmentMode::Practice => {
                    return Err(ApiError::BadRequest(
                        "Exams run in study or test mode".to_string(),
                    ));
                }
                AssessmentMode::Study if !access.can_study => {
                    return Err(ApiError::Forbidden("Study mode is not available for this exam"));
                }
                AssessmentMode::Test if !access.can_test => {
                    return Err(ApiError::Forbidden("Test mode is not available for this exam"));
                }
                _ => {}
            }

            let rows = exams::questions_for_exam(state.db(), &exam.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load exam questions"))?;
            let fixed = rows
                .into_iter()
                .map(|row| normalizer::normalize(&RawQuestion::ExamSpecific(row)))
                .collect();

            let descriptor = SubjectDescriptor {
                subject: SubjectId::Exam { exam_id: exam.id.clone() },
                title: exam.title.clone(),
                category: exam.category,
                fixed,
                target_count: exam.question_count as usize,
            };
            Ok((descriptor, mode))
        }
        StartRequest::StudyPack { pack_id } => {
            let pack = fetch_pack(state, &pack_id).await?;
            if !pack_visible_to(state, &pack, user).await? {
                return Err(ApiError::Forbidden("You do not have access to this study pack"));
            }

            let links = crate::repositories::study_packs::questions_for_pack(state.db(), &pack.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load pack questions"))?;
            let ids: Vec<String> = links.into_iter().map(|link| link.question_id).collect();

            let bank = SqlQuestionBank::new(state.db());
            let fixed = bank.fetch_by_ids(pack.category, &ids).await?;
            if fixed.is_empty() {
                return Err(ApiError::BadRequest(
                    "This study pack has no questions yet".to_string(),
                ));
            }

            let target_count = fixed.len();
            let descriptor = SubjectDescriptor {
                subject: SubjectId::StudyPack { pack_id: pack.id.clone() },
                title: pack.name.clone(),
                category: pack.category,
                fixed,
                target_count,
            };
            Ok((descriptor, AssessmentMode::Practice))
        }
    }
}
