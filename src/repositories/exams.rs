use sqlx::PgPool;

use crate::db::models::{Exam, ExamAssignment, ExamQuestion};
use crate::db::types::{AnswerType, Category};

const EXAM_COLUMNS: &str = "\
    id, title, description, category, question_count, is_active, study_enabled, \
    test_enabled, ai_prompt, created_by, created_at, updated_at";

const QUESTION_COLUMNS: &str = "\
    id, exam_id, prompt, answer_type, correct_answer, wrong1, wrong2, wrong3, \
    reference_answer, position, ai_source, created_at";

const ASSIGNMENT_COLUMNS: &str = "id, exam_id, user_id, can_study, can_test, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_active(pool: &PgPool) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams WHERE is_active = TRUE ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateExam<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: Category,
    pub question_count: i32,
    pub study_enabled: bool,
    pub test_enabled: bool,
    pub ai_prompt: Option<&'a str>,
    pub created_by: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, title, description, category, question_count, is_active,
            study_enabled, test_enabled, ai_prompt, created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,TRUE,$6,$7,$8,$9,$10,$10)
        RETURNING {EXAM_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.category)
    .bind(params.question_count)
    .bind(params.study_enabled)
    .bind(params.test_enabled)
    .bind(params.ai_prompt)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExam {
    pub title: Option<String>,
    pub description: Option<String>,
    pub question_count: Option<i32>,
    pub is_active: Option<bool>,
    pub study_enabled: Option<bool>,
    pub test_enabled: Option<bool>,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExam,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            question_count = COALESCE($3, question_count),
            is_active = COALESCE($4, is_active),
            study_enabled = COALESCE($5, study_enabled),
            test_enabled = COALESCE($6, test_enabled),
            updated_at = $7
         WHERE id = $8
         RETURNING {EXAM_COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.description)
    .bind(params.question_count)
    .bind(params.is_active)
    .bind(params.study_enabled)
    .bind(params.test_enabled)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn questions_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<ExamQuestion>, sqlx::Error> {
    sqlx::query_as::<_, ExamQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM exam_questions
         WHERE exam_id = $1 ORDER BY position, created_at"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateExamQuestion<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub prompt: &'a str,
    pub answer_type: AnswerType,
    pub correct_answer: Option<&'a str>,
    pub wrong1: Option<&'a str>,
    pub wrong2: Option<&'a str>,
    pub wrong3: Option<&'a str>,
    pub reference_answer: Option<&'a str>,
    pub position: i32,
    pub ai_source: Option<&'a str>,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_question(
    pool: &PgPool,
    params: CreateExamQuestion<'_>,
) -> Result<ExamQuestion, sqlx::Error> {
    sqlx::query_as::<_, ExamQuestion>(&format!(
        "INSERT INTO exam_questions (
            id, exam_id, prompt, answer_type, correct_answer, wrong1, wrong2, wrong3,
            reference_answer, position, ai_source, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.prompt)
    .bind(params.answer_type)
    .bind(params.correct_answer)
    .bind(params.wrong1)
    .bind(params.wrong2)
    .bind(params.wrong3)
    .bind(params.reference_answer)
    .bind(params.position)
    .bind(params.ai_source)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete_question(
    pool: &PgPool,
    exam_id: &str,
    question_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_questions WHERE id = $1 AND exam_id = $2")
        .bind(question_id)
        .bind(exam_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_questions_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_questions WHERE exam_id = $1")
        .bind(exam_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn assignments_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<ExamAssignment>, sqlx::Error> {
    sqlx::query_as::<_, ExamAssignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM exam_assignments WHERE exam_id = $1 ORDER BY created_at"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn assignment_for_user(
    pool: &PgPool,
    exam_id: &str,
    user_id: &str,
) -> Result<Option<ExamAssignment>, sqlx::Error> {
    sqlx::query_as::<_, ExamAssignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM exam_assignments WHERE exam_id = $1 AND user_id = $2"
    ))
    .bind(exam_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// An exam with no assignment rows is open to every student.
pub(crate) async fn has_assignments(pool: &PgPool, exam_id: &str) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM exam_assignments WHERE exam_id = $1")
            .bind(exam_id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub(crate) struct UpsertAssignment<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub user_id: &'a str,
    pub can_study: bool,
    pub can_test: bool,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn upsert_assignment(
    pool: &PgPool,
    params: UpsertAssignment<'_>,
) -> Result<ExamAssignment, sqlx::Error> {
    sqlx::query_as::<_, ExamAssignment>(&format!(
        "INSERT INTO exam_assignments (id, exam_id, user_id, can_study, can_test, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         ON CONFLICT (exam_id, user_id)
         DO UPDATE SET can_study = EXCLUDED.can_study, can_test = EXCLUDED.can_test
         RETURNING {ASSIGNMENT_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.user_id)
    .bind(params.can_study)
    .bind(params.can_test)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn remove_assignment(
    pool: &PgPool,
    exam_id: &str,
    user_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exam_assignments WHERE exam_id = $1 AND user_id = $2")
        .bind(exam_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
