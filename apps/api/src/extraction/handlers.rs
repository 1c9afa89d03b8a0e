use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::{require_text, AppError};
use crate::extraction::document::DocumentFormat;
use crate::extraction::models::CandidateProfile;
use crate::extraction::Unparseable;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExtractTextRequest {
    pub text: String,
}

/// Corpus skills used as extra heuristic keywords. Unavailable corpus ⇒ none.
async fn corpus_keywords(state: &AppState) -> Vec<String> {
    state
        .skill_corpus
        .distinct_skills()
        .await
        .unwrap_or_else(|e| {
            warn!("Skill corpus unavailable, extracting with built-in keywords: {e}");
            Vec::new()
        })
}

fn log_profile(profile: &CandidateProfile) {
    info!(
        tier = ?profile.tier,
        confidence = ?profile.confidence,
        skills = profile.skills.len(),
        "Profile extracted"
    );
}

/// POST /api/v1/profiles/extract
pub async fn handle_extract_text(
    State(state): State<AppState>,
    Json(req): Json<ExtractTextRequest>,
) -> Result<Json<CandidateProfile>, AppError> {
    let text = require_text(&req.text, "text")?;
    let keywords = corpus_keywords(&state).await;
    let profile = state.pipeline.extract(text, &keywords).await?;
    log_profile(&profile);
    Ok(Json(profile))
}

/// POST /api/v1/profiles/extract/document
/// Raw body; `Content-Type` selects the format (`application/pdf` or `text/plain`).
pub async fn handle_extract_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CandidateProfile>, AppError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let format = DocumentFormat::from_content_type(content_type).map_err(Unparseable::from)?;

    let keywords = corpus_keywords(&state).await;
    let profile = state
        .pipeline
        .extract_document(&body, format, &keywords)
        .await?;
    log_profile(&profile);
    Ok(Json(profile))
}
