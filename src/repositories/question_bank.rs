use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::{GrammarRow, TranslationRow, VocabularyRow};
use crate::db::types::Category;
use crate::engine::assembler::QuestionBank;
use crate::engine::error::EngineError;
use crate::engine::normalizer;
use crate::engine::question::{Question, RawQuestion};

const VOCABULARY_COLUMNS: &str = "id, word, correct_answer, wrong1, wrong2, wrong3, created_at";
const GRAMMAR_COLUMNS: &str =
    "id, sentence_with_placeholder, correct_answer, wrong1, wrong2, wrong3, created_at";
const TRANSLATION_COLUMNS: &str = "id, prompt, reference_answer, created_at";

pub(crate) async fn count(pool: &PgPool, category: Category) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", category.table()))
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_vocabulary(pool: &PgPool) -> Result<Vec<VocabularyRow>, sqlx::Error> {
    sqlx::query_as::<_, VocabularyRow>(&format!(
        "SELECT {VOCABULARY_COLUMNS} FROM questions_vocabulary ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_grammar(pool: &PgPool) -> Result<Vec<GrammarRow>, sqlx::Error> {
    sqlx::query_as::<_, GrammarRow>(&format!(
        "SELECT {GRAMMAR_COLUMNS} FROM questions_grammar ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_translation(pool: &PgPool) -> Result<Vec<TranslationRow>, sqlx::Error> {
    sqlx::query_as::<_, TranslationRow>(&format!(
        "SELECT {TRANSLATION_COLUMNS} FROM questions_translation ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateVocabulary<'a> {
    pub id: &'a str,
    pub word: &'a str,
    pub correct_answer: &'a str,
    pub wrong1: &'a str,
    pub wrong2: &'a str,
    pub wrong3: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_vocabulary(
    pool: &PgPool,
    params: CreateVocabulary<'_>,
) -> Result<VocabularyRow, sqlx::Error> {
    sqlx::query_as::<_, VocabularyRow>(&format!(
        "INSERT INTO questions_vocabulary (id, word, correct_answer, wrong1, wrong2, wrong3, created_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {VOCABULARY_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.word)
    .bind(params.correct_answer)
    .bind(params.wrong1)
    .bind(params.wrong2)
    .bind(params.wrong3)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateGrammar<'a> {
    pub id: &'a str,
    pub sentence_with_placeholder: &'a str,
    pub correct_answer: &'a str,
    pub wrong1: &'a str,
    pub wrong2: &'a str,
    pub wrong3: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_grammar(
    pool: &PgPool,
    params: CreateGrammar<'_>,
) -> Result<GrammarRow, sqlx::Error> {
    sqlx::query_as::<_, GrammarRow>(&format!(
        "INSERT INTO questions_grammar (
            id, sentence_with_placeholder, correct_answer, wrong1, wrong2, wrong3, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {GRAMMAR_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.sentence_with_placeholder)
    .bind(params.correct_answer)
    .bind(params.wrong1)
    .bind(params.wrong2)
    .bind(params.wrong3)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateTranslation<'a> {
    pub id: &'a str,
    pub prompt: &'a str,
    pub reference_answer: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_translation(
    pool: &PgPool,
    params: CreateTranslation<'_>,
) -> Result<TranslationRow, sqlx::Error> {
    sqlx::query_as::<_, TranslationRow>(&format!(
        "INSERT INTO questions_translation (id, prompt, reference_answer, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {TRANSLATION_COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.prompt)
    .bind(params.reference_answer)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateVocabulary<'a> {
    pub word: &'a str,
    pub correct_answer: &'a str,
    pub wrong1: &'a str,
    pub wrong2: &'a str,
    pub wrong3: &'a str,
}

pub(crate) async fn update_vocabulary(
    pool: &PgPool,
    id: &str,
    params: UpdateVocabulary<'_>,
) -> Result<Option<VocabularyRow>, sqlx::Error> {
    sqlx::query_as::<_, VocabularyRow>(&format!(
        "UPDATE questions_vocabulary
         SET word = $2, correct_answer = $3, wrong1 = $4, wrong2 = $5, wrong3 = $6
         WHERE id = $1
         RETURNING {VOCABULARY_COLUMNS}"
    ))
    .bind(id)
    .bind(params.word)
    .bind(params.correct_answer)
    .bind(params.wrong1)
    .bind(params.wrong2)
    .bind(params.wrong3)
    .fetch_optional(pool)
    .await
}

pub(crate) struct UpdateGrammar<'a> {
    pub sentence_with_placeholder: &'a str,
    pub correct_answer: &'a str,
    pub wrong1: &'a str,
    pub wrong2: &'a str,
    pub wrong3: &'a str,
}

pub(crate) async fn update_grammar(
    pool: &PgPool,
    id: &str,
    params: UpdateGrammar<'_>,
) -> Result<Option<GrammarRow>, sqlx::Error> {
    sqlx::query_as::<_, GrammarRow>(&format!(
        "UPDATE questions_grammar
         SET sentence_with_placeholder = $2, correct_answer = $3,
             wrong1 = $4, wrong2 = $5, wrong3 = $6
         WHERE id = $1
         RETURNING {GRAMMAR_COLUMNS}"
    ))
    .bind(id)
    .bind(params.sentence_with_placeholder)
    .bind(params.correct_answer)
    .bind(params.wrong1)
    .bind(params.wrong2)
    .bind(params.wrong3)
    .fetch_optional(pool)
    .await
}

pub(crate) struct UpdateTranslation<'a> {
    pub prompt: &'a str,
    pub reference_answer: &'a str,
}

pub(crate) async fn update_translation(
    pool: &PgPool,
    id: &str,
    params: UpdateTranslation<'_>,
) -> Result<Option<TranslationRow>, sqlx::Error> {
    sqlx::query_as::<_, TranslationRow>(&format!(
        "UPDATE questions_translation
         SET prompt = $2, reference_answer = $3
         WHERE id = $1
         RETURNING {TRANSLATION_COLUMNS}"
    ))
    .bind(id)
    .bind(params.prompt)
    .bind(params.reference_answer)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists(
    pool: &PgPool,
    category: Category,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE id = $1", category.table()))
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

/// Returns true when a row was deleted.
pub(crate) async fn delete(
    pool: &PgPool,
    category: Category,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", category.table()))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

async fn sample_raw(
    pool: &PgPool,
    category: Category,
    count: usize,
) -> Result<Vec<RawQuestion>, sqlx::Error> {
    let limit = count as i64;
    let rows = match category {
        Category::Vocabulary => sqlx::query_as::<_, VocabularyRow>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM questions_vocabulary ORDER BY RANDOM() LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(RawQuestion::Vocabulary)
        .collect(),
        Category::Grammar => sqlx::query_as::<_, GrammarRow>(&format!(
            "SELECT {GRAMMAR_COLUMNS} FROM questions_grammar ORDER BY RANDOM() LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(RawQuestion::Grammar)
        .collect(),
        Category::Translation => sqlx::query_as::<_, TranslationRow>(&format!(
            "SELECT {TRANSLATION_COLUMNS} FROM questions_translation ORDER BY RANDOM() LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(RawQuestion::Translation)
        .collect(),
    };
    Ok(rows)
}

async fn fetch_raw_by_ids(
    pool: &PgPool,
    category: Category,
    ids: &[String],
) -> Result<Vec<RawQuestion>, sqlx::Error> {
    let rows: Vec<RawQuestion> = match category {
        Category::Vocabulary => sqlx::query_as::<_, VocabularyRow>(&format!(
            "SELECT {VOCABULARY_COLUMNS} FROM questions_vocabulary WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(RawQuestion::Vocabulary)
        .collect(),
        Category::Grammar => sqlx::query_as::<_, GrammarRow>(&format!(
            "SELECT {GRAMMAR_COLUMNS} FROM questions_grammar WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(RawQuestion::Grammar)
        .collect(),
        Category::Translation => sqlx::query_as::<_, TranslationRow>(&format!(
            "SELECT {TRANSLATION_COLUMNS} FROM questions_translation WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(RawQuestion::Translation)
        .collect(),
    };
    Ok(rows)
}

fn raw_id(raw: &RawQuestion) -> &str {
    match raw {
        RawQuestion::Vocabulary(row) => &row.id,
        RawQuestion::Grammar(row) => &row.id,
        RawQuestion::Translation(row) => &row.id,
        RawQuestion::ExamSpecific(row) => &row.id,
    }
}

/// Postgres-backed question bank.
pub(crate) struct SqlQuestionBank<'a> {
    pool: &'a PgPool,
}

impl<'a> SqlQuestionBank<'a> {
    pub(crate) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionBank for SqlQuestionBank<'_> {
    async fn sample(&self, category: Category, count: usize) -> Result<Vec<Question>, EngineError> {
        let raw = sample_raw(self.pool, category, count).await?;
        if raw.is_empty() {
            return Err(EngineError::NoQuestionsAvailable { category });
        }
        Ok(raw.iter().map(normalizer::normalize).collect())
    }

    async fn fetch_by_ids(
        &self,
        category: Category,
        ids: &[String],
    ) -> Result<Vec<Question>, EngineError> {
        let raw = fetch_raw_by_ids(self.pool, category, ids).await?;
        // ANY($1) gives no ordering guarantee; restore the caller's order and
        // drop ids that no longer resolve.
        let questions = ids
            .iter()
            .filter_map(|id| raw.iter().find(|item| raw_id(item) == id))
            .map(normalizer::normalize)
            .collect();
        Ok(questions)
    }
}
