use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories::attempts;
use crate::schemas::attempt::{AttemptDetailResponse, AttemptResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list)).route("/:id", get(show))
}

#[derive(Debug, Deserialize)]
struct ListFilter {
    /// Teacher-only: restrict to one student's attempts.
    user_id: Option<String>,
    /// Teacher-only: restrict to attempts against one exam.
    exam_id: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<AttemptResponse>>, ApiError> {
    let rows = if user.is_teacher() {
        if let Some(exam_id) = filter.exam_id.as_deref() {
            attempts::list_for_exam(state.db(), exam_id).await
        } else if let Some(user_id) = filter.user_id.as_deref() {
            attempts::list_for_user(state.db(), user_id).await
        } else {
            attempts::list_all(state.db()).await
        }
    } else {
        // Students only ever see their own history.
        attempts::list_for_user(state.db(), &user.id).await
    }
    .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    Ok(Json(rows.into_iter().map(AttemptResponse::from_db).collect()))
}

async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<AttemptDetailResponse>, ApiError> {
    let attempt = attempts::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;

    if attempt.user_id != user.id && !user.is_teacher() {
        return Err(ApiError::Forbidden("You may only view your own attempts"));
    }

    Ok(Json(AttemptDetailResponse::from_db(attempt)))
}
