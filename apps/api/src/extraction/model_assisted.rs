//! Tier C — model-assisted extraction. The only tier that performs network I/O.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::extraction::models::{
    dedup_capped, truncate_chars, years_from_value, CandidateProfile, Confidence, ExtractionTier,
    MAX_CERTIFICATIONS, MAX_EDUCATION, MAX_SKILLS, SUMMARY_MAX_CHARS, UNKNOWN_NAME,
};
use crate::extraction::prompts::{PROFILE_EXTRACT_PROMPT_TEMPLATE, PROFILE_EXTRACT_SYSTEM};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_GUESSING_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

/// Longer documents are cut before being sent to the model.
const MAX_PROMPT_DOCUMENT_CHARS: usize = 12_000;

#[derive(Debug, Error)]
pub enum ModelExtractionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model response contained neither a name nor an email")]
    Unidentified,
}

/// Remote extraction backend. Any error means "no result"; the pipeline falls back.
#[async_trait]
pub trait ModelExtractor: Send + Sync {
    async fn extract_profile(&self, text: &str) -> Result<CandidateProfile, ModelExtractionError>;
}

/// Model-assisted extractor backed by the Anthropic Messages API.
pub struct LlmProfileExtractor {
    llm: LlmClient,
}

impl LlmProfileExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ModelExtractor for LlmProfileExtractor {
    async fn extract_profile(&self, text: &str) -> Result<CandidateProfile, ModelExtractionError> {
        let document: String = text.chars().take(MAX_PROMPT_DOCUMENT_CHARS).collect();
        let prompt = PROFILE_EXTRACT_PROMPT_TEMPLATE
            .replace("{no_guessing}", NO_GUESSING_INSTRUCTION)
            .replace("{resume_text}", &document);
        let system = format!("{PROFILE_EXTRACT_SYSTEM} {JSON_ONLY_SYSTEM}");

        let raw: ModelProfile = self.llm.call_json(&prompt, &system).await?;
        raw.into_profile()
    }
}

/// Wire shape of the model's answer. Every field is optional; list fields accept
/// either a JSON array or a comma-separated string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ModelProfile {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    linkedin: Option<String>,
    skills: Option<Value>,
    experience_years: Option<Value>,
    education: Option<Value>,
    certifications: Option<Value>,
    summary: Option<String>,
}

impl ModelProfile {
    pub(crate) fn into_profile(self) -> Result<CandidateProfile, ModelExtractionError> {
        let mut profile =
            CandidateProfile::empty(ExtractionTier::ModelAssisted, Confidence::High);

        profile.name = clean(self.name);
        profile.email = clean(self.email);
        if profile.name.is_empty() && profile.email.is_empty() {
            return Err(ModelExtractionError::Unidentified);
        }
        if profile.name.is_empty() {
            profile.name = UNKNOWN_NAME.to_string();
        }

        profile.phone = clean(self.phone);
        profile.location = clean(self.location);
        profile.linkedin = clean(self.linkedin);
        profile.skills = dedup_capped(string_list(self.skills), MAX_SKILLS);
        profile.experience_years = self
            .experience_years
            .as_ref()
            .map(years_from_value)
            .unwrap_or(0.0);
        profile.education = dedup_capped(string_list(self.education), MAX_EDUCATION);
        profile.certifications =
            dedup_capped(string_list(self.certifications), MAX_CERTIFICATIONS);
        profile.summary = truncate_chars(&clean(self.summary), SUMMARY_MAX_CHARS);

        Ok(profile)
    }
}

fn clean(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}
