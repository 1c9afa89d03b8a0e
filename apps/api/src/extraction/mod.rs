// Extraction pipeline — three ordered tiers with abstain/escalate semantics.
// Tiers A and B are synchronous CPU-bound code; Tier C is the only tier allowed
// network I/O and always runs under an explicit timeout.

pub mod document;
pub mod fields;
pub mod handlers;
pub mod heuristic;
pub mod model_assisted;
pub mod models;
pub mod prompts;
pub mod structured;

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::document::{extract_text, DocumentError, DocumentFormat};
use crate::extraction::heuristic::HeuristicExtractor;
use crate::extraction::model_assisted::ModelExtractor;
use crate::extraction::models::{CandidateProfile, Confidence};

/// Default minimum document length, in characters after trimming.
pub const DEFAULT_MIN_DOCUMENT_CHARS: usize = 50;

/// What a tier hands back to the orchestrator.
#[derive(Debug)]
pub enum TierOutcome {
    Terminal(CandidateProfile),
    Abstain {
        reason: &'static str,
        fallback: Option<CandidateProfile>,
    },
}

/// Hard extraction failure. Distinct from a low-confidence profile.
#[derive(Debug, Error)]
pub enum Unparseable {
    #[error("document text is empty")]
    Empty,

    #[error("document text has {chars} characters, at least {min} required")]
    TooShort { chars: usize, min: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Orchestrates the tiers. Only this type decides which result is terminal.
pub struct ExtractionPipeline {
    min_chars: usize,
    heuristic: HeuristicExtractor,
    model: Option<Arc<dyn ModelExtractor>>,
    model_timeout: Duration,
}

impl ExtractionPipeline {
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars,
            heuristic: HeuristicExtractor::default(),
            model: None,
            model_timeout: Duration::from_secs(30),
        }
    }

    /// Enables Tier C with the given backend and per-call timeout.
    pub fn with_model(mut self, model: Arc<dyn ModelExtractor>, timeout: Duration) -> Self {
        self.model = Some(model);
        self.model_timeout = timeout;
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Extracts a profile from plain text. `extra_keywords` extend Tier B's skill list.
    pub async fn extract(
        &self,
        text: &str,
        extra_keywords: &[String],
    ) -> Result<CandidateProfile, Unparseable> {
        let text = text.replace("\r\n", "\n");
        let chars = text.trim().chars().count();
        if chars == 0 {
            return Err(Unparseable::Empty);
        }
        if chars < self.min_chars {
            return Err(Unparseable::TooShort {
                chars,
                min: self.min_chars,
            });
        }

        let current_year = chrono::Utc::now().year();
        let fallback = {
            // Tiers run lazily, in order; the first terminal outcome wins.
            let tiers: [&dyn Fn() -> TierOutcome; 2] = [
                &|| structured::extract(&text, current_year),
                &|| self.run_heuristic(&text, extra_keywords),
            ];

            let mut fallback = None;
            for tier in tiers {
                match tier() {
                    TierOutcome::Terminal(profile) => {
                        debug!("Extraction terminal at tier {:?}", profile.tier);
                        return Ok(profile);
                    }
                    TierOutcome::Abstain {
                        reason,
                        fallback: retained,
                    } => {
                        debug!("Extraction tier abstained: {reason}");
                        if retained.is_some() {
                            fallback = retained;
                        }
                    }
                }
            }
            fallback
        };

        let fallback = fallback.unwrap_or_else(|| self.heuristic.extract(&text, extra_keywords));
        Ok(self.escalate(&text, fallback).await)
    }

    /// Extracts text from document bytes, then runs the tiers over it.
    pub async fn extract_document(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
        extra_keywords: &[String],
    ) -> Result<CandidateProfile, Unparseable> {
        let text = extract_text(bytes, format).await?;
        self.extract(&text, extra_keywords).await
    }

    fn run_heuristic(&self, text: &str, extra_keywords: &[String]) -> TierOutcome {
        let profile = self.heuristic.extract(text, extra_keywords);
        if profile.is_identified() {
            TierOutcome::Terminal(profile)
        } else {
            TierOutcome::Abstain {
                reason: "heuristic result lacks a name or email",
                fallback: Some(profile),
            }
        }
    }

    /// Tier C. Any failure returns the retained heuristic result instead.
    async fn escalate(&self, text: &str, fallback: CandidateProfile) -> CandidateProfile {
        let Some(model) = &self.model else {
            debug!("No model extractor configured, returning heuristic fallback");
            return downgrade(fallback);
        };

        match tokio::time::timeout(self.model_timeout, model.extract_profile(text)).await {
            Ok(Ok(profile)) => {
                debug!("Extraction terminal at model-assisted tier");
                profile
            }
            Ok(Err(e)) => {
                warn!("Model-assisted extraction failed, using heuristic result: {e}");
                downgrade(fallback)
            }
            Err(_) => {
                warn!(
                    "Model-assisted extraction timed out after {:?}, using heuristic result",
                    self.model_timeout
                );
                downgrade(fallback)
            }
        }
    }
}

fn downgrade(mut profile: CandidateProfile) -> CandidateProfile {
    if !profile.is_identified() {
        profile.confidence = Confidence::Low;
    }
    profile
}
