mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod matching;
mod routes;
mod state;
mod taxonomy;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::model_assisted::LlmProfileExtractor;
use crate::extraction::ExtractionPipeline;
use crate::llm_client::LlmClient;
use crate::matching::corpus::{
    CachedSkillCorpus, PgSkillCorpus, SkillCorpusProvider, StaticSkillCorpus,
};
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::SkillTaxonomy;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Compile the taxonomy patterns up front rather than on the first request
    let taxonomy = SkillTaxonomy::global();
    info!(
        "Skill taxonomy loaded ({} canonical skills)",
        taxonomy.canonical_skills().count()
    );

    // Skill corpus: PostgreSQL when configured, otherwise empty
    let skill_corpus: Arc<dyn SkillCorpusProvider> = match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            info!(
                "Skill corpus backed by PostgreSQL (ttl {:?})",
                config.skill_corpus_ttl
            );
            Arc::new(CachedSkillCorpus::new(
                PgSkillCorpus::new(db),
                config.skill_corpus_ttl,
                config.skill_corpus_query_timeout,
            ))
        }
        None => {
            info!("DATABASE_URL not set, skill corpus is empty");
            Arc::new(StaticSkillCorpus::default())
        }
    };

    // Extraction pipeline, with the model-assisted tier when a key is present
    let mut pipeline = ExtractionPipeline::new(config.min_document_chars);
    match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.model_timeout)
                .context("failed to build LLM client")?;
            info!(
                "Model-assisted extraction enabled (model: {}, timeout {:?})",
                llm_client::MODEL,
                config.model_timeout
            );
            pipeline = pipeline.with_model(
                Arc::new(LlmProfileExtractor::new(llm)),
                config.model_timeout,
            );
        }
        None => info!("ANTHROPIC_API_KEY not set, model-assisted extraction disabled"),
    }

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        skill_corpus,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
