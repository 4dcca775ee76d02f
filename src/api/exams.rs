use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Exam, User};
use crate::db::types::AnswerType;
use crate::repositories::exams;
use crate::schemas::exam::{
    AssignmentCreate, AssignmentResponse, ExamCreate, ExamQuestionCreate, ExamQuestionResponse,
    ExamResponse, ExamUpdate, GenerateQuestionsRequest, GenerateQuestionsResponse,
};
use crate::services::generation;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", post(create))
        .route("/:id", get(show))
        .route("/:id", patch(update))
        .route("/:id", delete(remove))
        .route("/:id/questions", get(list_questions))
        .route("/:id/questions", post(add_question))
        .route("/:id/questions/:question_id", delete(remove_question))
        .route("/:id/generate", post(generate_questions))
        .route("/:id/assignments", get(list_assignments))
        .route("/:id/assignments", post(assign))
        .route("/:id/assignments/:user_id", delete(unassign))
}

/// What the current student may do with one exam. Teachers bypass this.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExamAccess {
    pub(crate) can_study: bool,
    pub(crate) can_test: bool,
}

/// Assignment rules: an exam without assignments is open to everyone; once
/// any assignment exists, only assigned students get in, with the per-user
/// flags further gated by the exam's own mode toggles.
pub(crate) async fn exam_access_for(
    state: &AppState,
    exam: &Exam,
    user: &User,
) -> Result<ExamAccess, ApiError> {
    if user.is_teacher() {
        return Ok(ExamAccess { can_study: true, can_test: true });
    }

    if !exam.is_active {
        return Ok(ExamAccess { can_study: false, can_test: false });
    }

    let restricted = exams::has_assignments(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check exam assignments"))?;

    let (assigned_study, assigned_test) = if restricted {
        match exams::assignment_for_user(state.db(), &exam.id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load exam assignment"))?
        {
            Some(assignment) => (assignment.can_study, assignment.can_test),
            None => (false, false),
        }
    } else {
        (true, true)
    };

    Ok(ExamAccess {
        can_study: assigned_study && exam.study_enabled,
        can_test: assigned_test && exam.test_enabled,
    })
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let rows = if user.is_teacher() {
        exams::list_all(state.db()).await
    } else {
        exams::list_active(state.db()).await
    }
    .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    let mut visible = Vec::with_capacity(rows.len());
    for exam in rows {
        if !user.is_teacher() {
            let access = exam_access_for(&state, &exam, &user).await?;
            if !access.can_study && !access.can_test {
                continue;
            }
        }
        visible.push(ExamResponse::from_db(exam));
    }

    Ok(Json(visible))
}

async fn create(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Exam title must not be empty".to_string()));
    }

    let question_count = payload
        .question_count
        .unwrap_or(state.settings().assessment().default_question_count as i32);
    validate_question_count(&state, question_count)?;

    let exam = exams::create(
        state.db(),
        exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            category: payload.category,
            question_count,
            study_enabled: payload.study_enabled,
            test_enabled: payload.test_enabled,
            ai_prompt: payload.ai_prompt.as_deref(),
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam))))
}

async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = fetch_exam(&state, &id).await?;

    if !user.is_teacher() {
        let access = exam_access_for(&state, &exam, &user).await?;
        if !access.can_study && !access.can_test {
            return Err(ApiError::Forbidden("You do not have access to this exam"));
        }
    }

    Ok(Json(ExamResponse::from_db(exam)))
}

async fn update(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    if let Some(count) = payload.question_count {
        validate_question_count(&state, count)?;
    }

    let exam = exams::update(
        state.db(),
        &id,
        exams::UpdateExam {
            title: payload.title,
            description: payload.description,
            question_count: payload.question_count,
            is_active: payload.is_active,
            study_enabled: payload.study_enabled,
            test_enabled: payload.test_enabled,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?
    .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(ExamResponse::from_db(exam)))
}

async fn remove(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = exams::delete(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Exam not found".to_string()))
    }
}

async fn list_questions(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
) -> Result<Json<Vec<ExamQuestionResponse>>, ApiError> {
    fetch_exam(&state, &id).await?;
    let questions = exams::questions_for_exam(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam questions"))?;

    Ok(Json(questions.into_iter().map(ExamQuestionResponse::from_db).collect()))
}

async fn add_question(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
    Json(payload): Json<ExamQuestionCreate>,
) -> Result<(StatusCode, Json<ExamQuestionResponse>), ApiError> {
    fetch_exam(&state, &id).await?;

    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Question prompt must not be empty".to_string()));
    }
    match payload.answer_type {
        AnswerType::MultipleChoice => {
            if payload.correct_answer.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(ApiError::BadRequest(
                    "Multiple-choice questions need a correct_answer".to_string(),
                ));
            }
        }
        AnswerType::FreeText => {
            if payload.reference_answer.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(ApiError::BadRequest(
                    "Free-text questions need a reference_answer".to_string(),
                ));
            }
        }
    }

    let existing = exams::questions_for_exam(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam questions"))?;

    let question = exams::create_question(
        state.db(),
        exams::CreateExamQuestion {
            id: &Uuid::new_v4().to_string(),
            exam_id: &id,
            prompt: payload.prompt.trim(),
            answer_type: payload.answer_type,
            correct_answer: payload.correct_answer.as_deref(),
            wrong1: payload.wrong1.as_deref(),
            wrong2: payload.wrong2.as_deref(),
            wrong3: payload.wrong3.as_deref(),
            reference_answer: payload.reference_answer.as_deref(),
            position: existing.len() as i32,
            ai_source: None,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam question"))?;

    Ok((StatusCode::CREATED, Json(ExamQuestionResponse::from_db(question))))
}

async fn remove_question(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path((id, question_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let deleted = exams::delete_question(state.db(), &id, &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam question"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Exam question not found".to_string()))
    }
}

async fn generate_questions(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
    Json(payload): Json<GenerateQuestionsRequest>,
) -> Result<Json<GenerateQuestionsResponse>, ApiError> {
    let exam = fetch_exam(&state, &id).await?;

    let count = payload.count.unwrap_or(exam.question_count as usize);
    validate_question_count(&state, count as i32)?;

    let outcome = generation::generate_questions(
        state.ai(),
        exam.category,
        exam.ai_prompt.as_deref(),
        count,
    )
    .await;

    if payload.replace {
        exams::delete_questions_for_exam(state.db(), &id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to clear exam questions"))?;
    }

    let offset = if payload.replace {
        0
    } else {
        exams::questions_for_exam(state.db(), &id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list exam questions"))?
            .len()
    };

    let now = primitive_now_utc();
    let mut created = Vec::with_capacity(outcome.questions.len());
    for (index, question) in outcome.questions.iter().enumerate() {
        let row = exams::create_question(
            state.db(),
            exams::CreateExamQuestion {
                id: &Uuid::new_v4().to_string(),
                exam_id: &id,
                prompt: &question.prompt,
                answer_type: question.answer_type,
                correct_answer: question.correct_answer.as_deref(),
                wrong1: question.wrong1.as_deref(),
                wrong2: question.wrong2.as_deref(),
                wrong3: question.wrong3.as_deref(),
                reference_answer: question.reference_answer.as_deref(),
                position: (offset + index) as i32,
                ai_source: Some(outcome.source.as_str()),
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store generated question"))?;
        created.push(ExamQuestionResponse::from_db(row));
    }

    Ok(Json(GenerateQuestionsResponse {
        source: outcome.source.as_str().to_string(),
        questions: created,
    }))
}

async fn list_assignments(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    fetch_exam(&state, &id).await?;
    let assignments = exams::assignments_for_exam(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

async fn assign(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    fetch_exam(&state, &id).await?;

    let student = crate::repositories::users::find_by_id(state.db(), &payload.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let assignment = exams::upsert_assignment(
        state.db(),
        exams::UpsertAssignment {
            id: &Uuid::new_v4().to_string(),
            exam_id: &id,
            user_id: &student.id,
            can_study: payload.can_study,
            can_test: payload.can_test,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to assign exam"))?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from_db(assignment))))
}

async fn unassign(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let removed = exams::remove_assignment(state.db(), &id, &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove assignment"))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Assignment not found".to_string()))
    }
}

pub(crate) async fn fetch_exam(state: &AppState, id: &str) -> Result<Exam, ApiError> {
    exams::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

fn validate_question_count(state: &AppState, count: i32) -> Result<(), ApiError> {
    let max = state.settings().assessment().max_question_count as i32;
    if count < 1 || count > max {
        return Err(ApiError::BadRequest(format!(
            "question_count must be between 1 and {max}"
        )));
    }
    Ok(())
}
