//! Tier B — pattern heuristics that need no document structure. Always produces a
//! profile; whether it is good enough to stop at is the orchestrator's call.

use crate::extraction::fields::{
    find_email_lenient, find_experience_years, find_linkedin, find_location,
    find_phone_lenient, is_plausible_name, name_from_email,
};
use crate::extraction::models::{
    dedup_capped, CandidateProfile, Confidence, ExtractionTier, MAX_SKILLS, UNKNOWN_NAME,
};
use crate::taxonomy::contains_term;

/// Built-in keyword list checked against every document.
pub const DEFAULT_SKILL_KEYWORDS: &[&str] = &[
    "JavaScript", "Python", "Java", "React", "Node.js", "Angular", "Vue", "Django",
    "SQL", "MySQL", "PostgreSQL", "MongoDB", "Redis", "AWS", "Azure", "GCP",
    "Docker", "Kubernetes", "Git", "TypeScript", "C++", "C#", "PHP", "Ruby",
    "Go", "Swift", "Kotlin", "HTML", "CSS", "REST", "GraphQL", "Jenkins",
    "Terraform", "Ansible", "Linux", "Agile", "Scrum", "CI/CD", "Express",
    "Spring", "Flask", "FastAPI", "Laravel", "Rails", "ASP.NET", "Pandas",
    "NumPy", "TensorFlow", "PyTorch", "Scikit-learn", "Keras", "OpenCV",
    "Selenium", "Jest", "Mocha", "Cypress", "JUnit", "Pytest", "Postman",
];

/// Number of leading non-empty lines searched for a name.
const NAME_SCAN_LINES: usize = 10;

#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    keywords: Vec<String>,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_SKILL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HeuristicExtractor {
    /// Runs every field heuristic over `text`. `extra_keywords` (usually the
    /// recorded skill corpus) extend the built-in list for this call.
    pub fn extract(&self, text: &str, extra_keywords: &[String]) -> CandidateProfile {
        let mut profile = CandidateProfile::empty(ExtractionTier::Heuristic, Confidence::Medium);

        profile.email = find_email_lenient(text).unwrap_or_default();
        profile.phone = find_phone_lenient(text).unwrap_or_default();
        profile.name = self.find_name(text, &profile.email);
        profile.skills = self.match_keywords(text, extra_keywords);
        profile.experience_years = find_experience_years(text).unwrap_or(0.0);
        profile.linkedin = find_linkedin(text).unwrap_or_default();
        profile.location = find_location(text).unwrap_or_default();

        profile
    }

    fn find_name(&self, text: &str, email: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(NAME_SCAN_LINES)
            .find(|line| is_plausible_name(line))
            .map(String::from)
            .or_else(|| name_from_email(email))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    fn match_keywords(&self, text: &str, extra_keywords: &[String]) -> Vec<String> {
        let lower = text.to_lowercase();
        let hits = self
            .keywords
            .iter()
            .chain(extra_keywords.iter())
            .filter(|kw| kw.trim().chars().count() > 1)
            .filter(|kw| contains_term(&lower, kw))
            .cloned();
        dedup_capped(hits, MAX_SKILLS)
    }
}
