//! Requirement miner — required skills and experience bounds from free job-description text.
//!
//! Skills come from five independent scanners whose results are unioned; each
//! scanner is a pure `(text) -> set` function. The last one is permissive and only
//! runs when the others found fewer than three skills.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matching::corpus::SkillCorpusProvider;
use crate::taxonomy::{contains_term, SkillTaxonomy};

/// Below this many skills the permissive technical-token scan is added.
const PERMISSIVE_SCAN_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    None,
    Minimum,
    Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRequirement {
    #[serde(rename = "type")]
    pub kind: RequirementKind,
    pub min: f64,
    pub max: Option<f64>,
}

impl ExperienceRequirement {
    pub fn none() -> Self {
        Self {
            kind: RequirementKind::None,
            min: 0.0,
            max: None,
        }
    }

    pub fn minimum(min: f64) -> Self {
        Self {
            kind: RequirementKind::Minimum,
            min,
            max: None,
        }
    }

    /// A range whose lower bound exceeds its upper bound degrades to `none`.
    pub fn range(min: f64, max: f64) -> Self {
        if min > max {
            return Self::none();
        }
        Self {
            kind: RequirementKind::Range,
            min,
            max: Some(max),
        }
    }

    /// Re-checks a requirement that arrived from outside (e.g. deserialized) and
    /// degrades inconsistent shapes to `none`.
    pub fn sanitized(self) -> Self {
        let finite = |v: f64| v.is_finite() && v >= 0.0;
        match (self.kind, self.max) {
            (RequirementKind::None, _) => Self::none(),
            (RequirementKind::Minimum, _) if finite(self.min) => Self::minimum(self.min),
            (RequirementKind::Range, Some(max)) if finite(self.min) && finite(max) => {
                Self::range(self.min, max)
            }
            _ => Self::none(),
        }
    }
}

/// Skills and experience bound mined from one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub required_skills: BTreeSet<String>,
    pub experience_requirement: ExperienceRequirement,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid requirement pattern {pattern:?}: {e}"))
}

const NUMBER: &str = r"(\d+(?:\.\d+)?)";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i){NUMBER}\s*\+?\s*(?:to|-|–|—)\s*{NUMBER}\s*(?:years?|yrs?)\b"
    ))
});
static MINIMUM_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(&format!(r"(?i){NUMBER}\s*\+\s*(?:years?|yrs?)\b")),
        compile(&format!(r"(?i)\bminimum\s*(?:of\s*)?{NUMBER}\s*(?:years?|yrs?)\b")),
        compile(&format!(r"(?i)\bat\s+least\s*{NUMBER}\s*(?:years?|yrs?)\b")),
        compile(&format!(r"(?i){NUMBER}\s*(?:years?|yrs?)\b.*experience")),
    ]
});

static CAPITALIZED_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b[A-Z][A-Za-z0-9]*(?:\.[A-Za-z]+)?(?:\+\+|#)?"));

static LEAD_IN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(?:experience\s+(?:with|in)|proficiency\s+(?:in|with)|proficient\s+(?:in|with)|knowledge\s+of|familiarity\s+with|required\s+skills\s*:|skills\s*:|technologies\s*:|tech\s+stack\s*:)[ \t]*([^\n]*)",
    )
});
static CONJUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\s+(?:and|or)\s+"));

static TECHNICAL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:[A-Za-z][A-Za-z0-9]*(?:(?i:\.js|\.net|\.io)|JS|SQL|DB|QL|Ops)|Py[A-Za-z]+)\b")
});

/// Level 1: every canonical skill with a variant in the text.
pub fn scan_taxonomy(text: &str) -> BTreeSet<String> {
    SkillTaxonomy::global().scan_text(text)
}

/// Level 2: Title-Case / CamelCase tokens that are exactly a known variant.
pub fn scan_capitalized_tokens(text: &str) -> BTreeSet<String> {
    let taxonomy = SkillTaxonomy::global();
    CAPITALIZED_TOKEN_RE
        .find_iter(text)
        .filter_map(|m| taxonomy.canonical_of(m.as_str()))
        .map(String::from)
        .collect()
}

/// Level 3: lists introduced by phrases such as "experience with" or "tech stack:".
pub fn scan_lead_in_phrases(text: &str) -> BTreeSet<String> {
    let taxonomy = SkillTaxonomy::global();
    let mut found = BTreeSet::new();

    for caps in LEAD_IN_RE.captures_iter(text) {
        let Some(clause) = caps.get(1) else {
            continue;
        };
        let clause = CONJUNCTION_RE.replace_all(sentence_prefix(clause.as_str()), ",");
        for fragment in clause.split([',', ';', '/', '|', '&']) {
            let fragment = fragment.trim_matches(|c: char| {
                c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\'' | ':')
            });
            if fragment.is_empty() {
                continue;
            }
            match taxonomy.canonical_of(fragment) {
                Some(canonical) => {
                    found.insert(canonical.to_string());
                }
                None => found.extend(
                    taxonomy
                        .canonical_skills()
                        .filter(|canonical| taxonomy.is_variant_of(canonical, fragment))
                        .map(String::from),
                ),
            }
        }
    }

    found
}

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &["e.g.", "i.e.", "etc.", "vs.", "incl.", "approx."];

/// Cuts a clause at the first sentence terminator. A period only ends the sentence
/// when followed by whitespace or end of text, so `Node.js` stays intact, and never
/// when it closes one of [`ABBREVIATIONS`].
fn sentence_prefix(clause: &str) -> &str {
    let mut chars = clause.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let ends = match c {
            '!' | '?' => true,
            '.' => {
                chars.peek().map_or(true, |&(_, next)| next.is_whitespace())
                    && !ends_with_abbreviation(&clause[..=i])
            }
            _ => false,
        };
        if ends {
            return &clause[..i];
        }
    }
    clause
}

fn ends_with_abbreviation(prefix: &str) -> bool {
    let word = prefix
        .rsplit(|c: char| c.is_whitespace() || matches!(c, '(' | ','))
        .next()
        .unwrap_or(prefix);
    ABBREVIATIONS.iter().any(|abbr| word.eq_ignore_ascii_case(abbr))
}

/// Level 4: recorded corpus skills that occur in the text. Known skills are
/// canonicalized; unknown ones are kept as lowercase free text.
pub fn scan_corpus(text: &str, corpus: &[String]) -> BTreeSet<String> {
    let taxonomy = SkillTaxonomy::global();
    corpus
        .iter()
        .map(|skill| skill.trim())
        .filter(|skill| skill.chars().count() > 1)
        .filter(|skill| contains_term(text, skill))
        .map(|skill| {
            taxonomy
                .canonical_of(skill)
                .map(String::from)
                .unwrap_or_else(|| skill.to_lowercase())
        })
        .collect()
}

/// Level 5: tokens with technical suffixes (`.js`, `SQL`, `Ops`, ...) or a `Py` prefix.
pub fn scan_technical_tokens(text: &str) -> BTreeSet<String> {
    let taxonomy = SkillTaxonomy::global();
    TECHNICAL_TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() > 2)
        .map(|token| {
            taxonomy
                .canonical_of(token)
                .map(String::from)
                .unwrap_or_else(|| token.to_lowercase())
        })
        .collect()
}

/// Experience bound: range, then the minimum shapes in order, else `none`.
pub fn extract_experience_requirement(text: &str) -> ExperienceRequirement {
    if let Some(caps) = RANGE_RE.captures(text) {
        let min = caps[1].parse::<f64>().ok();
        let max = caps[2].parse::<f64>().ok();
        return match (min, max) {
            (Some(min), Some(max)) => ExperienceRequirement::range(min, max),
            _ => ExperienceRequirement::none(),
        };
    }

    MINIMUM_RES
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(ExperienceRequirement::minimum)
        .unwrap_or_else(ExperienceRequirement::none)
}

/// Runs every scanner over `text` with an already-loaded corpus.
pub fn mine_requirement(text: &str, corpus: &[String]) -> JobRequirement {
    let mut skills = scan_taxonomy(text);
    skills.extend(scan_capitalized_tokens(text));
    skills.extend(scan_lead_in_phrases(text));
    skills.extend(scan_corpus(text, corpus));

    if skills.len() < PERMISSIVE_SCAN_THRESHOLD {
        debug!(
            "Only {} skills found, adding permissive technical-token scan",
            skills.len()
        );
        skills.extend(scan_technical_tokens(text));
    }

    JobRequirement {
        required_skills: skills,
        experience_requirement: extract_experience_requirement(text),
    }
}

/// [`mine_requirement`] with the corpus fetched from `provider`. A provider
/// failure degrades to an empty corpus.
pub async fn mine_with_corpus(text: &str, provider: &dyn SkillCorpusProvider) -> JobRequirement {
    let corpus = provider.distinct_skills().await.unwrap_or_else(|e| {
        warn!("Skill corpus unavailable, mining without it: {e}");
        Vec::new()
    });
    mine_requirement(text, &corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::corpus::{CorpusError, StaticSkillCorpus};
    use async_trait::async_trait;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_taxonomy_scan_canonicalizes() {
        let found = scan_taxonomy("Looking for a ReactJS dev who knows Golang and k8s");
        assert_eq!(found, set(&["go", "kubernetes", "react"]));
    }

    #[test]
    fn test_capitalized_tokens_match_symbol_shapes() {
        let found = scan_capitalized_tokens("We use Node.js, C++ and C# daily. Great Team.");
        assert_eq!(found, set(&["c#", "c++", "node"]));
    }

    #[test]
    fn test_lead_in_phrase_clause_is_split() {
        let found = scan_lead_in_phrases(
            "Candidates need experience with Kafka, Redis and Postgres. Salary is great.",
        );
        assert_eq!(found, set(&["redis", "sql"]));
    }

    #[test]
    fn test_lead_in_stops_at_sentence_but_not_at_dotted_names() {
        let found = scan_lead_in_phrases("Tech stack: Node.js / Vue.js. Python is a bonus.");
        assert_eq!(found, set(&["node", "vue"]));
    }

    #[test]
    fn test_lead_in_clause_survives_abbreviations() {
        let found = scan_lead_in_phrases("Some experience with e.g. React, Node etc. is needed");
        assert_eq!(found, set(&["node", "react"]));

        let found = scan_lead_in_phrases("Experience with Docker (i.e. containers). Pay is good.");
        assert_eq!(found, set(&["docker"]));
    }

    #[test]
    fn test_corpus_scan_keeps_unknown_skills_as_free_text() {
        let corpus = vec![
            "Salesforce".to_string(),
            "React.js".to_string(),
            "Go".to_string(),
            "x".to_string(),
        ];
        let found = scan_corpus("Salesforce admin with React.js; going places", &corpus);
        assert_eq!(found, set(&["react", "salesforce"]));
    }

    #[test]
    fn test_technical_tokens() {
        let found = scan_technical_tokens("Next.js, MySQL, DynamoDB, DevOps, PySpark and SQL");
        assert!(found.contains("next.js"));
        assert!(found.contains("sql"));
        assert!(found.contains("dynamodb"));
        assert!(found.contains("devops"));
        assert!(found.contains("pyspark"));
    }

    #[test]
    fn test_permissive_scan_only_when_few_skills() {
        let sparse = mine_requirement("Must know Next.js and NestJS.", &[]);
        assert!(sparse.required_skills.contains("next.js"));
        assert!(sparse.required_skills.contains("nestjs"));

        let rich = mine_requirement("React, Python, Docker, AWS and NestJS.", &[]);
        assert!(!rich.required_skills.contains("nestjs"));
    }

    #[test]
    fn test_no_skills_for_non_technical_text() {
        let req = mine_requirement("We are hiring a friendly barista for our cafe.", &[]);
        assert!(req.required_skills.is_empty());
        assert_eq!(req.experience_requirement, ExperienceRequirement::none());
    }

    #[test]
    fn test_experience_range_shapes() {
        assert_eq!(
            extract_experience_requirement("3-5 years of experience"),
            ExperienceRequirement::range(3.0, 5.0)
        );
        assert_eq!(
            extract_experience_requirement("3 to 5 years in backend"),
            ExperienceRequirement::range(3.0, 5.0)
        );
        assert_eq!(
            extract_experience_requirement("4–6 yrs"),
            ExperienceRequirement::range(4.0, 6.0)
        );
    }

    #[test]
    fn test_experience_minimum_shapes() {
        for text in [
            "5+ years with Rust",
            "Minimum of 5 years",
            "minimum 5 years",
            "at least 5 years",
            "5 years of professional experience",
        ] {
            assert_eq!(
                extract_experience_requirement(text),
                ExperienceRequirement::minimum(5.0),
                "{text}"
            );
        }
    }

    #[test]
    fn test_malformed_range_degrades_to_none() {
        assert_eq!(
            extract_experience_requirement("7-3 years"),
            ExperienceRequirement::none()
        );
    }

    #[test]
    fn test_sanitized_requirement() {
        let bad = ExperienceRequirement {
            kind: RequirementKind::Range,
            min: 6.0,
            max: Some(2.0),
        };
        assert_eq!(bad.sanitized(), ExperienceRequirement::none());
        let missing_max = ExperienceRequirement {
            kind: RequirementKind::Range,
            min: 2.0,
            max: None,
        };
        assert_eq!(missing_max.sanitized(), ExperienceRequirement::none());
        assert_eq!(
            ExperienceRequirement::minimum(3.0).sanitized(),
            ExperienceRequirement::minimum(3.0)
        );
    }

    #[test]
    fn test_requirement_serialization_shape() {
        let req = mine_requirement("Docker and AWS, 2-4 years", &[]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["required_skills"], serde_json::json!(["aws", "docker"]));
        assert_eq!(json["experience_requirement"]["type"], "range");
        assert_eq!(json["experience_requirement"]["max"], 4.0);
    }

    struct BrokenCorpus;

    #[async_trait]
    impl SkillCorpusProvider for BrokenCorpus {
        async fn distinct_skills(&self) -> Result<Vec<String>, CorpusError> {
            Err(CorpusError::Database(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_mine_with_corpus_uses_provider() {
        let corpus = StaticSkillCorpus::new(["Salesforce"]);
        let req = mine_with_corpus("Salesforce and Docker admin", &corpus).await;
        assert_eq!(req.required_skills, set(&["docker", "salesforce"]));
    }

    #[tokio::test]
    async fn test_mine_with_broken_corpus_degrades() {
        let req = mine_with_corpus("Salesforce and Docker admin", &BrokenCorpus).await;
        assert_eq!(req.required_skills, set(&["docker"]));
    }
}
