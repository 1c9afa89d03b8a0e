pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::document::MAX_DOCUMENT_BYTES;
use crate::extraction::handlers as extraction;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile extraction
        .route(
            "/api/v1/profiles/extract",
            post(extraction::handle_extract_text),
        )
        .route(
            "/api/v1/profiles/extract/document",
            post(extraction::handle_extract_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES)),
        )
        // Requirement mining & scoring
        .route(
            "/api/v1/requirements",
            post(matching::handle_mine_requirements),
        )
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/match/rank", post(matching::handle_rank))
        .with_state(state)
}
