use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::services::{analysis, extraction};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(analyze))
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    filename: String,
    word_count: usize,
    summary: String,
    /// False when the AI reviewer was unavailable and a local digest was
    /// returned instead.
    ai_generated: bool,
}

async fn analyze(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let max_bytes = state.settings().uploads().max_upload_size_mb * 1024 * 1024;

    let mut filename: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
            {
                let next_size = bytes.len() as u64 + chunk.len() as u64;
                if next_size > max_bytes {
                    return Err(ApiError::BadRequest(format!(
                        "File size exceeds {}MB limit",
                        state.settings().uploads().max_upload_size_mb
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            data = Some(bytes);
        }
    }

    let filename = filename.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let data = data.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;

    let text = extraction::extract_text(
        &filename,
        &data,
        &state.settings().uploads().allowed_text_extensions,
    )
    .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let analysis = analysis::analyze_text(state.ai(), &text).await;

    Ok(Json(AnalyzeResponse {
        filename,
        word_count: analysis.word_count,
        summary: analysis.summary,
        ai_generated: analysis.ai_generated,
    }))
}
