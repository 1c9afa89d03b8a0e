//! Tier A — section-based extraction for documents with recognizable headers.

use std::sync::LazyLock;

use regex::Regex;

use crate::extraction::fields::{
    find_email, find_experience_years, find_linkedin, find_location, find_phone,
    infer_year_span, is_plausible_name, split_list_line,
};
use crate::extraction::models::{
    dedup_capped, truncate_chars, CandidateProfile, Confidence, ExtractionTier, MAX_CERTIFICATIONS,
    MAX_EDUCATION, MAX_SKILLS, SUMMARY_MAX_CHARS, UNKNOWN_NAME,
};
use crate::extraction::TierOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
}

const SECTION_KEYWORDS: &[(Section, &[&str])] = &[
    (Section::Summary, &["summary", "objective", "profile", "about"]),
    (
        Section::Skills,
        &["skills", "technical skills", "technologies", "expertise", "competencies"],
    ),
    (
        Section::Experience,
        &[
            "experience",
            "work history",
            "employment",
            "work experience",
            "professional experience",
        ],
    ),
    (Section::Education, &["education", "academic", "qualifications"]),
    (Section::Projects, &["projects", "portfolio"]),
    (
        Section::Certifications,
        &["certifications", "certificates", "licenses"],
    ),
];

/// Headers must occupy their own line, optionally followed by a colon.
static SECTION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut keywords: Vec<&str> = SECTION_KEYWORDS
        .iter()
        .flat_map(|(_, kws)| kws.iter().copied())
        .collect();
    // longest first so "work experience" wins over "experience"
    keywords.sort_by_key(|kw| std::cmp::Reverse(kw.len()));
    let alternation = keywords
        .iter()
        .map(|kw| regex::escape(kw).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?im)^[ \t]*({alternation})[ \t]*:?[ \t]*$"))
        .unwrap_or_else(|e| panic!("section header pattern: {e}"))
});

const MIN_SECTION_HEADERS: usize = 2;

struct SectionSpan<'a> {
    section: Section,
    body: &'a str,
}

fn section_for(keyword: &str) -> Option<Section> {
    let keyword = keyword.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(_, kws)| kws.contains(&keyword.as_str()))
        .map(|(section, _)| *section)
}

/// Runs Tier A. Abstains when fewer than two headers are present, or when the
/// header block does not yield both a name and an email.
pub(crate) fn extract(text: &str, current_year: i32) -> TierOutcome {
    let headers: Vec<_> = SECTION_HEADER_RE.captures_iter(text).collect();
    if headers.len() < MIN_SECTION_HEADERS {
        return TierOutcome::Abstain {
            reason: "fewer than two section headers",
            fallback: None,
        };
    }

    let mut spans = Vec::with_capacity(headers.len());
    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        if let Some(section) = section_for(keyword.as_str()) {
            spans.push(SectionSpan {
                section,
                body: text[whole.end()..end].trim(),
            });
        }
    }

    let header_end = headers
        .first()
        .and_then(|c| c.get(0))
        .map(|m| m.start())
        .unwrap_or(0);
    let header_block = text[..header_end].trim();

    let profile = parse_sections(text, header_block, &spans, current_year);
    if profile.is_identified() {
        TierOutcome::Terminal(profile)
    } else {
        TierOutcome::Abstain {
            reason: "header block lacks a name or email",
            fallback: None,
        }
    }
}

fn parse_sections(
    text: &str,
    header_block: &str,
    spans: &[SectionSpan<'_>],
    current_year: i32,
) -> CandidateProfile {
    let mut profile = CandidateProfile::empty(ExtractionTier::Structured, Confidence::High);

    profile.name = header_block
        .lines()
        .map(str::trim)
        .find(|line| is_plausible_name(line))
        .map(String::from)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    profile.email = find_email(header_block).unwrap_or_default();
    profile.phone = find_phone(header_block).unwrap_or_default();
    profile.linkedin = find_linkedin(header_block).unwrap_or_default();
    profile.location = find_location(header_block).unwrap_or_default();

    // A section header may repeat; the first occurrence wins.
    let body_of = |wanted: Section| {
        spans
            .iter()
            .find(|s| s.section == wanted)
            .map(|s| s.body)
    };

    if let Some(summary) = body_of(Section::Summary) {
        profile.summary = truncate_chars(summary, SUMMARY_MAX_CHARS);
    }

    if let Some(skills) = body_of(Section::Skills) {
        let fragments = skills
            .lines()
            .flat_map(split_list_line)
            .filter(|s| (2..30).contains(&s.chars().count()))
            .map(String::from);
        profile.skills = dedup_capped(fragments, MAX_SKILLS);
    }

    profile.experience_years = find_experience_years(text)
        .or_else(|| {
            body_of(Section::Experience).and_then(|body| infer_year_span(body, current_year))
        })
        .unwrap_or(0.0);

    if let Some(education) = body_of(Section::Education) {
        profile.education = section_lines(education, 5, MAX_EDUCATION);
    }

    if let Some(certifications) = body_of(Section::Certifications) {
        profile.certifications = section_lines(certifications, 3, MAX_CERTIFICATIONS);
    }

    profile
}

fn section_lines(body: &str, min_chars: usize, cap: usize) -> Vec<String> {
    let lines = body
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|l| l.chars().count() > min_chars)
        .map(String::from);
    dedup_capped(lines, cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED_RESUME: &str = "\
Jane Doe
jane.doe@example.com | +91 9876543210
Austin, TX
linkedin.com/in/janedoe

Summary
Backend engineer focused on distributed systems and developer tooling.

Technical Skills
Rust, Go, Python
PostgreSQL | Docker • Kubernetes
rust

Experience
Acme Corp, Senior Engineer 2018 - 2021
Globex, Engineer 2015 - 2018

Education
B.Tech Computer Science, IIT Delhi 2015

Certifications
AWS Certified Solutions Architect
";

    fn terminal(outcome: TierOutcome) -> CandidateProfile {
        match outcome {
            TierOutcome::Terminal(profile) => profile,
            TierOutcome::Abstain { reason, .. } => panic!("unexpected abstain: {reason}"),
        }
    }

    #[test]
    fn test_structured_resume_is_terminal() {
        let profile = terminal(extract(STRUCTURED_RESUME, 2026));
        assert_eq!(profile.tier, ExtractionTier::Structured);
        assert_eq!(profile.confidence, Confidence::High);
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.email, "jane.doe@example.com");
        assert_eq!(profile.phone, "+91 9876543210");
        assert_eq!(profile.location, "Austin, TX");
        assert_eq!(profile.linkedin, "https://linkedin.com/in/janedoe");
    }

    #[test]
    fn test_structured_sections_parsed() {
        let profile = terminal(extract(STRUCTURED_RESUME, 2026));
        assert_eq!(
            profile.skills,
            vec!["Rust", "Go", "Python", "PostgreSQL", "Docker", "Kubernetes"]
        );
        assert_eq!(profile.experience_years, 6.0);
        assert_eq!(profile.education, vec!["B.Tech Computer Science, IIT Delhi 2015"]);
        assert_eq!(
            profile.certifications,
            vec!["AWS Certified Solutions Architect"]
        );
        assert!(profile.summary.starts_with("Backend engineer"));
    }

    #[test]
    fn test_explicit_experience_phrase_wins_over_year_span() {
        let text = STRUCTURED_RESUME.replace(
            "Backend engineer focused",
            "Backend engineer with 9 years of experience focused",
        );
        let profile = terminal(extract(&text, 2026));
        assert_eq!(profile.experience_years, 9.0);
    }

    #[test]
    fn test_experience_prose_does_not_extend_year_span() {
        let text = STRUCTURED_RESUME.replace(
            "Globex, Engineer 2015 - 2018",
            "Globex, Engineer 2015 - 2018\nRewrote the current billing pipeline",
        );
        let profile = terminal(extract(&text, 2026));
        assert_eq!(profile.experience_years, 6.0);
    }

    #[test]
    fn test_single_header_abstains() {
        let text = "Jane Doe\njane@example.com\n\nSkills\nRust, Go\n";
        assert!(matches!(
            extract(text, 2026),
            TierOutcome::Abstain { fallback: None, .. }
        ));
    }

    #[test]
    fn test_missing_email_abstains() {
        let text = STRUCTURED_RESUME.replace("jane.doe@example.com | ", "");
        assert!(matches!(extract(&text, 2026), TierOutcome::Abstain { .. }));
    }

    #[test]
    fn test_header_keyword_inside_sentence_is_not_a_header() {
        let text = "Jane Doe\njane@example.com\nMy experience with skills is broad.\nSkills\nRust\n";
        // only the standalone "Skills" line counts
        assert!(matches!(extract(text, 2026), TierOutcome::Abstain { .. }));
    }

    #[test]
    fn test_headers_with_colons_and_case() {
        let text = "Jane Doe\njane@example.com\nSKILLS:\nRust\nWORK EXPERIENCE:\n2019 - 2022 Initech\n";
        let profile = terminal(extract(text, 2026));
        assert_eq!(profile.skills, vec!["Rust"]);
        assert_eq!(profile.experience_years, 3.0);
    }

    #[test]
    fn test_skills_capped_at_twenty() {
        let skills: Vec<String> = (0..30).map(|i| format!("Skill{i}")).collect();
        let text = format!(
            "Jane Doe\njane@example.com\nSkills\n{}\nEducation\nBSc Physics, MIT\n",
            skills.join(", ")
        );
        let profile = terminal(extract(&text, 2026));
        assert_eq!(profile.skills.len(), MAX_SKILLS);
    }
}
