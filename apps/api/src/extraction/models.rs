use serde::{Deserialize, Deserializer, Serialize};

/// Name placeholder used until a tier resolves a real name.
pub const UNKNOWN_NAME: &str = "Unknown";
pub const MAX_SKILLS: usize = 20;
pub const MAX_EDUCATION: usize = 5;
pub const MAX_CERTIFICATIONS: usize = 10;
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Which extractor produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionTier {
    Structured,
    Heuristic,
    ModelAssisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Structured candidate profile extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub summary: String,
    pub tier: ExtractionTier,
    pub confidence: Confidence,
}

impl CandidateProfile {
    pub(crate) fn empty(tier: ExtractionTier, confidence: Confidence) -> Self {
        Self {
            name: UNKNOWN_NAME.to_string(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            linkedin: String::new(),
            skills: Vec::new(),
            experience_years: 0.0,
            education: Vec::new(),
            certifications: Vec::new(),
            summary: String::new(),
            tier,
            confidence,
        }
    }

    pub fn has_resolved_name(&self) -> bool {
        !self.name.trim().is_empty() && self.name != UNKNOWN_NAME
    }

    /// Name and email both present — the bar a tier must clear to be terminal.
    pub fn is_identified(&self) -> bool {
        self.has_resolved_name() && !self.email.trim().is_empty()
    }
}

/// Deduplicates case-insensitively (first spelling wins), drops blanks, keeps order.
pub(crate) fn dedup_capped<I>(items: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(cap)
        .collect()
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    text.trim().chars().take(max).collect::<String>().trim_end().to_string()
}

/// Accepts experience given as a number, a numeric string ("5", "3.5 years") or
/// null. Anything unusable, negative or non-finite becomes 0.
pub(crate) fn deserialize_years<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(years_from_value).unwrap_or(0.0))
}

pub(crate) fn years_from_value(value: &serde_json::Value) -> f64 {
    let years = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => leading_number(s).unwrap_or(0.0),
        _ => 0.0,
    };
    sanitize_years(years)
}

pub(crate) fn sanitize_years(years: f64) -> f64 {
    if years.is_finite() && years > 0.0 {
        years
    } else {
        0.0
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Years {
        #[serde(default, deserialize_with = "deserialize_years")]
        years: f64,
    }

    fn years(value: serde_json::Value) -> f64 {
        serde_json::from_value::<Years>(json!({ "years": value }))
            .unwrap()
            .years
    }

    #[test]
    fn test_tier_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ExtractionTier::ModelAssisted).unwrap(),
            r#""model-assisted""#
        );
        assert_eq!(
            serde_json::to_string(&ExtractionTier::Structured).unwrap(),
            r#""structured""#
        );
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), r#""medium""#);
    }

    #[test]
    fn test_empty_profile_is_unidentified() {
        let profile = CandidateProfile::empty(ExtractionTier::Heuristic, Confidence::Medium);
        assert_eq!(profile.name, UNKNOWN_NAME);
        assert!(!profile.has_resolved_name());
        assert!(!profile.is_identified());
    }

    #[test]
    fn test_identified_requires_name_and_email() {
        let mut profile = CandidateProfile::empty(ExtractionTier::Structured, Confidence::High);
        profile.name = "Ada Lovelace".to_string();
        assert!(!profile.is_identified());
        profile.email = "ada@example.com".to_string();
        assert!(profile.is_identified());
    }

    #[test]
    fn test_dedup_capped_is_case_insensitive_and_ordered() {
        let items = vec!["Rust", "rust", " Go ", "", "SQL", "Kafka"]
            .into_iter()
            .map(String::from);
        assert_eq!(dedup_capped(items, 3), vec!["Rust", "Go", "SQL"]);
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("  short  ", 200), "short");
    }

    #[test]
    fn test_years_accepts_numbers_and_strings() {
        assert_eq!(years(json!(4.5)), 4.5);
        assert_eq!(years(json!("7")), 7.0);
        assert_eq!(years(json!("3.5 years")), 3.5);
        assert_eq!(years(json!(null)), 0.0);
        assert_eq!(years(json!(-2)), 0.0);
        assert_eq!(years(json!("several")), 0.0);
    }

    #[test]
    fn test_years_missing_field_defaults_to_zero() {
        let parsed: Years = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.years, 0.0);
    }
}
