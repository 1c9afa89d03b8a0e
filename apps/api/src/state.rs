use std::sync::Arc;

use crate::extraction::ExtractionPipeline;
use crate::matching::corpus::SkillCorpusProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExtractionPipeline>,
    /// Recorded skills of the surrounding system. In-memory when no database is configured.
    pub skill_corpus: Arc<dyn SkillCorpusProvider>,
}
