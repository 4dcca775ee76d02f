use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{StudyPack, User};
use crate::repositories::{question_bank, study_packs, users};
use crate::schemas::study_pack::{
    PackAssignmentCreate, PackQuestionAdd, PackQuestionResponse, StudyPackCreate,
    StudyPackResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", post(create))
        .route("/:id", get(show))
        .route("/:id", delete(remove))
        .route("/:id/questions", get(list_questions))
        .route("/:id/questions", post(add_question))
        .route("/:id/questions/:question_id", delete(remove_question))
        .route("/:id/assignments", post(assign))
}

/// Unassigned packs are open to everyone; once assigned, only students with
/// a can_view assignment may open them.
pub(crate) async fn pack_visible_to(
    state: &AppState,
    pack: &StudyPack,
    user: &User,
) -> Result<bool, ApiError> {
    if user.is_teacher() {
        return Ok(true);
    }

    let restricted = study_packs::has_assignments(state.db(), &pack.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check pack assignments"))?;
    if !restricted {
        return Ok(true);
    }

    let assignment = study_packs::assignment_for_user(state.db(), &pack.id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load pack assignment"))?;

    Ok(assignment.map(|a| a.can_view).unwrap_or(false))
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<StudyPackResponse>>, ApiError> {
    let packs = if user.is_teacher() {
        study_packs::list_all(state.db()).await
    } else {
        study_packs::list_visible_to(state.db(), &user.id).await
    }
    .map_err(|e| ApiError::internal(e, "Failed to list study packs"))?;

    let mut responses = Vec::with_capacity(packs.len());
    for pack in packs {
        let questions = study_packs::questions_for_pack(state.db(), &pack.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count pack questions"))?;
        responses.push(StudyPackResponse::from_db(pack, questions.len()));
    }

    Ok(Json(responses))
}

async fn create(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<StudyPackCreate>,
) -> Result<(StatusCode, Json<StudyPackResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Study pack name must not be empty".to_string()));
    }

    let pack = study_packs::create(
        state.db(),
        study_packs::CreateStudyPack {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            category: payload.category,
            description: payload.description.as_deref(),
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create study pack"))?;

    Ok((StatusCode::CREATED, Json(StudyPackResponse::from_db(pack, 0))))
}

async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<StudyPackResponse>, ApiError> {
    let pack = fetch_pack(&state, &id).await?;

    if !pack_visible_to(&state, &pack, &user).await? {
        return Err(ApiError::Forbidden("You do not have access to this study pack"));
    }

    let questions = study_packs::questions_for_pack(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count pack questions"))?;

    Ok(Json(StudyPackResponse::from_db(pack, questions.len())))
}

async fn remove(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = study_packs::delete(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete study pack"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Study pack not found".to_string()))
    }
}

async fn list_questions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<PackQuestionResponse>>, ApiError> {
    let pack = fetch_pack(&state, &id).await?;
    if !pack_visible_to(&state, &pack, &user).await? {
        return Err(ApiError::Forbidden("You do not have access to this study pack"));
    }

    let questions = study_packs::questions_for_pack(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list pack questions"))?;

    Ok(Json(questions.into_iter().map(PackQuestionResponse::from_db).collect()))
}

async fn add_question(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
    Json(payload): Json<PackQuestionAdd>,
) -> Result<StatusCode, ApiError> {
    let pack = fetch_pack(&state, &id).await?;

    let known = question_bank::exists(state.db(), pack.category, &payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to look up question"))?;
    if !known {
        return Err(ApiError::NotFound(format!(
            "No {} question with that id",
            pack.category.as_str()
        )));
    }

    study_packs::add_question(
        state.db(),
        &Uuid::new_v4().to_string(),
        &id,
        pack.category,
        &payload.question_id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to add question to pack"))?;

    Ok(StatusCode::CREATED)
}

async fn remove_question(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path((id, question_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let removed = study_packs::remove_question(state.db(), &id, &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove question from pack"))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Question is not part of this pack".to_string()))
    }
}

async fn assign(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(id): Path<String>,
    Json(payload): Json<PackAssignmentCreate>,
) -> Result<StatusCode, ApiError> {
    fetch_pack(&state, &id).await?;

    let student = users::find_by_id(state.db(), &payload.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    study_packs::upsert_assignment(
        state.db(),
        &Uuid::new_v4().to_string(),
        &id,
        &student.id,
        payload.can_view,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to assign study pack"))?;

    Ok(StatusCode::CREATED)
}

pub(crate) async fn fetch_pack(state: &AppState, id: &str) -> Result<StudyPack, ApiError> {
    study_packs::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load study pack"))?
        .ok_or_else(|| ApiError::NotFound("Study pack not found".to_string()))
}
