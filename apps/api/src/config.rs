use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::extraction::DEFAULT_MIN_DOCUMENT_CHARS;

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Enables the PostgreSQL skill corpus when set.
    pub database_url: Option<String>,
    /// Enables model-assisted extraction when set to a real key.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub model_timeout: Duration,
    pub min_document_chars: usize,
    pub skill_corpus_ttl: Duration,
    /// Upper bound on one corpus refresh; on expiry the stale corpus is served.
    pub skill_corpus_query_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            anthropic_api_key: usable_api_key(optional_env("ANTHROPIC_API_KEY")),
            port: parse_var("PORT", optional_env("PORT"), 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            model_timeout: Duration::from_secs(parse_var(
                "MODEL_TIMEOUT_SECS",
                optional_env("MODEL_TIMEOUT_SECS"),
                30,
            )?),
            min_document_chars: parse_var(
                "MIN_DOCUMENT_CHARS",
                optional_env("MIN_DOCUMENT_CHARS"),
                DEFAULT_MIN_DOCUMENT_CHARS,
            )?,
            skill_corpus_ttl: Duration::from_secs(parse_var(
                "SKILL_CORPUS_TTL_SECS",
                optional_env("SKILL_CORPUS_TTL_SECS"),
                300,
            )?),
            skill_corpus_query_timeout: Duration::from_secs(parse_var(
                "SKILL_CORPUS_QUERY_TIMEOUT_SECS",
                optional_env("SKILL_CORPUS_QUERY_TIMEOUT_SECS"),
                5,
            )?),
        })
    }
}

/// Set and non-blank, trimmed.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `.env.example` placeholders such as `your_api_key_here` count as unset.
fn usable_api_key(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.starts_with("your_"))
}

fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_api_key_disables_model() {
        assert_eq!(usable_api_key(Some("your_anthropic_key".to_string())), None);
        assert_eq!(usable_api_key(None), None);
        assert_eq!(
            usable_api_key(Some("sk-ant-123".to_string())),
            Some("sk-ant-123".to_string())
        );
    }

    #[test]
    fn test_parse_var_defaults_and_errors() {
        assert_eq!(parse_var::<u16>("PORT", None, 8080).unwrap(), 8080);
        assert_eq!(parse_var::<u16>("PORT", Some("9000".to_string()), 8080).unwrap(), 9000);

        let err = parse_var::<u64>("MODEL_TIMEOUT_SECS", Some("soon".to_string()), 30)
            .unwrap_err();
        assert!(err.to_string().contains("MODEL_TIMEOUT_SECS"));
    }
}
