use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::{require_text, AppError};
use crate::extraction::models::deserialize_years;
use crate::matching::requirements::{mine_with_corpus, JobRequirement};
use crate::matching::scoring::{rank_candidates, score_safely, CandidateInput, MatchResult, RankedCandidate};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RequirementsRequest {
    pub jd_text: String,
}

#[derive(Deserialize)]
pub struct CandidateSkills {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_years")]
    pub experience_years: f64,
}

#[derive(Deserialize)]
pub struct MatchRequest {
    pub jd_text: String,
    pub candidate: CandidateSkills,
}

#[derive(Deserialize)]
pub struct RankRequest {
    pub jd_text: String,
    #[serde(default)]
    pub candidates: Vec<CandidateInput>,
}

async fn mine(state: &AppState, jd_text: &str) -> Result<JobRequirement, AppError> {
    let jd_text = require_text(jd_text, "jd_text")?;
    Ok(mine_with_corpus(jd_text, state.skill_corpus.as_ref()).await)
}

/// POST /api/v1/requirements
pub async fn handle_mine_requirements(
    State(state): State<AppState>,
    Json(req): Json<RequirementsRequest>,
) -> Result<Json<JobRequirement>, AppError> {
    Ok(Json(mine(&state, &req.jd_text).await?))
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let requirement = mine(&state, &req.jd_text).await?;
    let result = score_safely(
        &req.candidate.skills,
        req.candidate.experience_years,
        &requirement,
    );
    Ok(Json(result))
}

/// POST /api/v1/match/rank
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(req): Json<RankRequest>,
) -> Result<Json<Vec<RankedCandidate>>, AppError> {
    let requirement = mine(&state, &req.jd_text).await?;
    let candidates = req.candidates;

    // CPU-bound for large candidate lists — keep it off the async executor.
    let ranked = tokio::task::spawn_blocking(move || rank_candidates(&requirement, candidates))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in ranking: {e}")))?;

    tracing::debug!("Ranked {} candidates", ranked.len());
    Ok(Json(ranked))
}
