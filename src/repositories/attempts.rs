use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::Attempt;
use crate::engine::error::EngineError;
use crate::engine::session::{AttemptRecorder, NewAttempt, SubjectId};

const COLUMNS: &str = "\
    id, user_id, subject_kind, subject_title, category, exam_id, study_pack_id, \
    mode, score, total, details, ai_summary, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE exam_id = $1 ORDER BY created_at DESC"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

/// Postgres-backed attempt sink for completed sessions.
pub(crate) struct SqlAttemptRecorder<'a> {
    pool: &'a PgPool,
}

impl<'a> SqlAttemptRecorder<'a> {
    pub(crate) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptRecorder for SqlAttemptRecorder<'_> {
    async fn record(&self, attempt: NewAttempt<'_>) -> Result<String, EngineError> {
        let id = Uuid::new_v4().to_string();
        let (exam_id, study_pack_id) = match attempt.subject {
            SubjectId::Quiz { .. } => (None, None),
            SubjectId::Exam { exam_id } => (Some(exam_id.as_str()), None),
            SubjectId::StudyPack { pack_id } => (None, Some(pack_id.as_str())),
        };
        let details = serde_json::to_value(attempt.answers)
            .map_err(|err| EngineError::Validation(err.to_string()))?;

        sqlx::query(
            "INSERT INTO attempts (
                id, user_id, subject_kind, subject_title, category, exam_id, study_pack_id,
                mode, score, total, details, ai_summary, created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)",
        )
        .bind(&id)
        .bind(attempt.user_id)
        .bind(attempt.subject.kind())
        .bind(attempt.subject_title)
        .bind(attempt.category)
        .bind(exam_id)
        .bind(study_pack_id)
        .bind(attempt.mode)
        .bind(attempt.score as i32)
        .bind(attempt.total as i32)
        .bind(sqlx::types::Json(details))
        .bind(attempt.ai_summary)
        .bind(primitive_now_utc())
        .execute(self.pool)
        .await?;

        Ok(id)
    }
}
