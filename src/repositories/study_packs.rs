use sqlx::PgPool;

use crate::db::models::{StudyPack, StudyPackAssignment, StudyPackQuestion};
use crate::db::types::Category;

const PACK_COLUMNS: &str = "id, name, category, description, created_by, created_at";
const QUESTION_COLUMNS: &str = "id, pack_id, category, question_id, created_at";
const ASSIGNMENT_COLUMNS: &str = "id, pack_id, user_id, can_view, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<StudyPack>, sqlx::Error> {
    sqlx::query_as::<_, StudyPack>(&format!("SELECT {PACK_COLUMNS} FROM study_packs WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<StudyPack>, sqlx::Error> {
    sqlx::query_as::<_, StudyPack>(&format!(
        "SELECT {PACK_COLUMNS} FROM study_packs ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Packs the student may open: assigned with can_view, or unassigned packs
/// which are open to everyone.
pub(crate) async fn list_visible_to(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<StudyPack>, sqlx::Error> {
    sqlx::query_as::<_, StudyPack>(&format!(
        "SELECT {PACK_COLUMNS} FROM study_packs p
         WHERE NOT EXISTS (SELECT 1 FROM study_pack_assignments a WHERE a.pack_id = p.id)
            OR EXISTS (
                SELECT 1 FROM study_pack_assignments a
                WHERE a.pack_id = p.id AND a.user_id = $1 AND a.can_view = TRUE
            )
         ORDER BY p.created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateStudyPack<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub category: Category,
    pub description: Option<&'a str>,
    pub created_by: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateStudyPack<'_>,
) -> Result<StudyPack, sqlx::Error> {
    sqlx::query_as::<_, StudyPack>(&format!(
        "INSERT INTO study_packs (id, name, category, description, created_by, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {PACK_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.category)
    .bind(params.description)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM study_packs WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn questions_for_pack(
    pool: &PgPool,
    pack_id: &str,
) -> Result<Vec<StudyPackQuestion>, sqlx::Error> {
    sqlx::query_as::<_, StudyPackQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM study_pack_questions
         WHERE pack_id = $1 ORDER BY created_at"
    ))
    .bind(pack_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn add_question(
    pool: &PgPool,
    id: &str,
    pack_id: &str,
    category: Category,
    question_id: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO study_pack_questions (id, pack_id, category, question_id, created_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (pack_id, category, question_id) DO NOTHING",
    )
    .bind(id)
    .bind(pack_id)
    .bind(category)
    .bind(question_id)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn remove_question(
    pool: &PgPool,
    pack_id: &str,
    question_id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM study_pack_questions WHERE pack_id = $1 AND question_id = $2")
            .bind(pack_id)
            .bind(question_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn has_assignments(pool: &PgPool, pack_id: &str) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM study_pack_assignments WHERE pack_id = $1")
            .bind(pack_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub(crate) async fn assignment_for_user(
    pool: &PgPool,
    pack_id: &str,
    user_id: &str,
) -> Result<Option<StudyPackAssignment>, sqlx::Error> {
    sqlx::query_as::<_, StudyPackAssignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM study_pack_assignments
         WHERE pack_id = $1 AND user_id = $2"
    ))
    .bind(pack_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn upsert_assignment(
    pool: &PgPool,
    id: &str,
    pack_id: &str,
    user_id: &str,
    can_view: bool,
    created_at: time::PrimitiveDateTime,
) -> Result<StudyPackAssignment, sqlx::Error> {
    sqlx::query_as::<_, StudyPackAssignment>(&format!(
        "INSERT INTO study_pack_assignments (id, pack_id, user_id, can_view, created_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (pack_id, user_id)
         DO UPDATE SET can_view = EXCLUDED.can_view
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(pack_id)
    .bind(user_id)
    .bind(can_view)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
