use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::Category;
use crate::repositories::question_bank;
use crate::schemas::question::{
    BankCounts, GrammarCreate, GrammarResponse, TranslationCreate, TranslationResponse,
    VocabularyCreate, VocabularyResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/counts", get(counts))
        .route("/:category", get(list))
        .route("/:category", post(create))
        .route("/:category/:id", put(update))
        .route("/:category/:id", delete(remove))
}

fn parse_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse().map_err(|_| ApiError::BadRequest(format!("Unknown category '{raw}'")))
}

async fn counts(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<BankCounts>, ApiError> {
    let vocabulary = question_bank::count(state.db(), Category::Vocabulary)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count vocabulary questions"))?;
    let grammar = question_bank::count(state.db(), Category::Grammar)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count grammar questions"))?;
    let translation = question_bank::count(state.db(), Category::Translation)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count translation questions"))?;

    Ok(Json(BankCounts { vocabulary, grammar, translation }))
}

async fn list(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(category): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let category = parse_category(&category)?;
    let items = match category {
        Category::Vocabulary => {
            let rows = question_bank::list_vocabulary(state.db())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list vocabulary questions"))?;
            json!(rows.into_iter().map(VocabularyResponse::from_db).collect::<Vec<_>>())
        }
        Category::Grammar => {
            let rows = question_bank::list_grammar(state.db())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list grammar questions"))?;
            json!(rows.into_iter().map(GrammarResponse::from_db).collect::<Vec<_>>())
        }
        Category::Translation => {
            let rows = question_bank::list_translation(state.db())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list translation questions"))?;
            json!(rows.into_iter().map(TranslationResponse::from_db).collect::<Vec<_>>())
        }
    };

    Ok(Json(items))
}

async fn create(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(category): Path<String>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let category = parse_category(&category)?;
    let id = Uuid::new_v4().to_string();
    let now = primitive_now_utc();

    let created = match category {
        Category::Vocabulary => {
            let payload: VocabularyCreate = parse_payload(payload)?;
            require_non_empty("word", &payload.word)?;
            require_non_empty("correct_answer", &payload.correct_answer)?;
            let row = question_bank::create_vocabulary(
                state.db(),
                question_bank::CreateVocabulary {
                    id: &id,
                    word: payload.word.trim(),
                    correct_answer: payload.correct_answer.trim(),
                    wrong1: payload.wrong1.trim(),
                    wrong2: payload.wrong2.trim(),
                    wrong3: payload.wrong3.trim(),
                    created_at: now,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create vocabulary question"))?;
            json!(VocabularyResponse::from_db(row))
        }
        Category::Grammar => {
            let payload: GrammarCreate = parse_payload(payload)?;
            require_non_empty("sentence", &payload.sentence)?;
            require_non_empty("correct_answer", &payload.correct_answer)?;
            if !payload.sentence.contains("__") {
                return Err(ApiError::BadRequest(
                    "Grammar sentence must contain a '__' blank marker".to_string(),
                ));
            }
            let row = question_bank::create_grammar(
                state.db(),
                question_bank::CreateGrammar {
                    id: &id,
                    sentence_with_placeholder: payload.sentence.trim(),
                    correct_answer: payload.correct_answer.trim(),
                    wrong1: payload.wrong1.trim(),
                    wrong2: payload.wrong2.trim(),
                    wrong3: payload.wrong3.trim(),
                    created_at: now,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create grammar question"))?;
            json!(GrammarResponse::from_db(row))
        }
        Category::Translation => {
            let payload: TranslationCreate = parse_payload(payload)?;
            require_non_empty("prompt", &payload.prompt)?;
            require_non_empty("reference_answer", &payload.reference_answer)?;
            let row = question_bank::create_translation(
                state.db(),
                question_bank::CreateTranslation {
                    id: &id,
                    prompt: payload.prompt.trim(),
                    reference_answer: payload.reference_answer.trim(),
                    created_at: now,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to create translation question"))?;
            json!(TranslationResponse::from_db(row))
        }
    };

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path((category, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let category = parse_category(&category)?;

    let updated = match category {
        Category::Vocabulary => {
            let payload: VocabularyCreate = parse_payload(payload)?;
            require_non_empty("word", &payload.word)?;
            require_non_empty("correct_answer", &payload.correct_answer)?;
            question_bank::update_vocabulary(
                state.db(),
                &id,
                question_bank::UpdateVocabulary {
                    word: payload.word.trim(),
                    correct_answer: payload.correct_answer.trim(),
                    wrong1: payload.wrong1.trim(),
                    wrong2: payload.wrong2.trim(),
                    wrong3: payload.wrong3.trim(),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update vocabulary question"))?
            .map(|row| json!(VocabularyResponse::from_db(row)))
        }
        Category::Grammar => {
            let payload: GrammarCreate = parse_payload(payload)?;
            require_non_empty("sentence", &payload.sentence)?;
            require_non_empty("correct_answer", &payload.correct_answer)?;
            if !payload.sentence.contains("__") {
                return Err(ApiError::BadRequest(
                    "Grammar sentence must contain a '__' blank marker".to_string(),
                ));
            }
            question_bank::update_grammar(
                state.db(),
                &id,
                question_bank::UpdateGrammar {
                    sentence_with_placeholder: payload.sentence.trim(),
                    correct_answer: payload.correct_answer.trim(),
                    wrong1: payload.wrong1.trim(),
                    wrong2: payload.wrong2.trim(),
                    wrong3: payload.wrong3.trim(),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update grammar question"))?
            .map(|row| json!(GrammarResponse::from_db(row)))
        }
        Category::Translation => {
            let payload: TranslationCreate = parse_payload(payload)?;
            require_non_empty("prompt", &payload.prompt)?;
            require_non_empty("reference_answer", &payload.reference_answer)?;
            question_bank::update_translation(
                state.db(),
                &id,
                question_bank::UpdateTranslation {
                    prompt: payload.prompt.trim(),
                    reference_answer: payload.reference_answer.trim(),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update translation question"))?
            .map(|row| json!(TranslationResponse::from_db(row)))
        }
    };

    match updated {
        Some(body) => Ok(Json(body)),
        None => Err(ApiError::NotFound("Question not found".to_string())),
    }
}

async fn remove(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path((category, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let category = parse_category(&category)?;
    let deleted = question_bank::delete(state.db(), category, &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Question not found".to_string()))
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::BadRequest(err.to_string()))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("Field '{field}' must not be empty")))
    } else {
        Ok(())
    }
}
