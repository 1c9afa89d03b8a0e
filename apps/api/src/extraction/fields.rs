//! Field finders shared by the structured and heuristic tiers.
//!
//! Every finder is first-match-wins over an ordered pattern list and returns `None`
//! rather than guessing.

use std::sync::LazyLock;

use regex::Regex;

use crate::extraction::models::sanitize_years;

fn compile(pattern: &str) -> Regex {
    // Patterns in this module are literals covered by tests.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid field pattern {pattern:?}: {e}"))
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"));
static EMAIL_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:e-?mail|mail)\s*:?\s*([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})")
});
// PDF text extraction sometimes splits "name @ domain.com"
static EMAIL_SPACED_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"([A-Za-z0-9._%+-]+)[ \t]+@[ \t]*([A-Za-z0-9.-]+\.[A-Za-z]{2,})|([A-Za-z0-9._%+-]+)@[ \t]+([A-Za-z0-9.-]+\.[A-Za-z]{2,})")
});

/// How many digits a phone match must carry to be accepted.
#[derive(Debug, Clone, Copy)]
enum DigitRule {
    /// Exactly 10 digits, or 12 digits carrying the `91` country code.
    Domestic,
    /// 8 to 15 digits (E.164 bounds).
    International,
}

impl DigitRule {
    fn accepts(self, digits: &str) -> bool {
        match self {
            DigitRule::Domestic => {
                digits.len() == 10 || (digits.len() == 12 && digits.starts_with("91"))
            }
            DigitRule::International => (8..=15).contains(&digits.len()),
        }
    }
}

/// Locale-specific mobile patterns first, generic international last.
static PHONE_PATTERNS: LazyLock<Vec<(Regex, DigitRule)>> = LazyLock::new(|| {
    vec![
        (compile(r"\+91[-\s]?[6-9]\d{9}\b"), DigitRule::Domestic),
        (compile(r"\b[6-9]\d{9}\b"), DigitRule::Domestic),
        (compile(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b"), DigitRule::Domestic),
        (compile(r"\(\d{3}\)[-.\s]?\d{3}[-.\s]?\d{4}\b"), DigitRule::Domestic),
        (
            compile(r"\+\d{1,3}(?:[-. ]?\(?\d{1,4}\)?){2,5}"),
            DigitRule::International,
        ),
    ]
});
static PHONE_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:phone|mobile|contact|cell|tel|telephone)\s*(?:no\.?|number)?\s*:?\s*([\d \-+()]{10,})")
});

static LINKEDIN_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)linkedin\.com/in/[\w-]+"));
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*,[ \t]*(?:[A-Z]{2}|[A-Z][a-z]+)\b")
});
static DIGIT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\d{3,}"));
static EXPERIENCE_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)(\d+(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\.?\s*(?:of\s+)?(?:\w+\s+)?(?:experience|exp)\b")
});
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b(?:19|20)\d{2}\b"));
static ONGOING_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:19|20)\d{2}\s*(?:-|–|—|to|till|until)\s*(?:present|current|now|till date|to date|date)\b")
});

/// Document-title lines that look like names but never are.
const TITLE_LINES: &[&str] = &["resume", "résumé", "curriculum vitae", "cv", "bio-data", "biodata"];

const MAX_EXPERIENCE_SPAN_YEARS: i32 = 50;

/// First bare email token in `text`, lowercased.
pub(crate) fn find_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase())
        .find(|e| is_valid_email(e))
}

/// Ordered email search: bare token, `Email:` label, then a token split around `@`.
pub(crate) fn find_email_lenient(text: &str) -> Option<String> {
    find_email(text)
        .or_else(|| {
            EMAIL_LABEL_RE
                .captures(text)
                .map(|c| c[1].to_lowercase())
                .filter(|e| is_valid_email(e))
        })
        .or_else(|| {
            EMAIL_SPACED_RE.captures(text).and_then(|c| {
                let local = c.get(1).or_else(|| c.get(3))?;
                let domain = c.get(2).or_else(|| c.get(4))?;
                let email = format!("{}@{}", local.as_str(), domain.as_str()).to_lowercase();
                is_valid_email(&email).then_some(email)
            })
        })
}

fn is_valid_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

/// First phone number that passes its pattern's digit rule.
pub(crate) fn find_phone(text: &str) -> Option<String> {
    PHONE_PATTERNS.iter().find_map(|(re, rule)| {
        re.find_iter(text)
            .map(|m| m.as_str().trim())
            .find(|candidate| rule.accepts(&digits_of(candidate)))
            .map(String::from)
    })
}

/// [`find_phone`] followed by a `Phone:` / `Mobile:` label fallback.
pub(crate) fn find_phone_lenient(text: &str) -> Option<String> {
    find_phone(text).or_else(|| {
        PHONE_LABEL_RE
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .filter(|p| DigitRule::Domestic.accepts(&digits_of(p)))
    })
}

fn digits_of(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// LinkedIn profile URL normalized to `https://linkedin.com/in/<handle>` form.
pub(crate) fn find_linkedin(text: &str) -> Option<String> {
    LINKEDIN_RE
        .find(text)
        .map(|m| format!("https://{}", m.as_str()))
}

/// First `City, ST` or `City, Country` token.
pub(crate) fn find_location(text: &str) -> Option<String> {
    LOCATION_RE.find(text).map(|m| m.as_str().to_string())
}

/// A line that can stand as a person's name: 3–60 characters, contains letters,
/// no run of three or more digits, no email token.
pub(crate) fn is_plausible_name(line: &str) -> bool {
    let line = line.trim();
    let len = line.chars().count();
    (3..=60).contains(&len)
        && line.chars().any(char::is_alphabetic)
        && !DIGIT_RUN_RE.is_match(line)
        && !line.contains('@')
        && !TITLE_LINES.contains(&line.to_lowercase().trim_end_matches(':'))
}

/// Derives a display name from an email's local part: `john.doe92@x.io` → `John Doe`.
pub(crate) fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?;
    let name = local
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Explicit "N years (of) experience" phrase.
pub(crate) fn find_experience_years(text: &str) -> Option<f64> {
    EXPERIENCE_PHRASE_RE
        .captures(text)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(sanitize_years)
        .filter(|y| *y > 0.0)
}

/// Years between the earliest and latest year token in `text`. An open-ended range
/// such as "2019 - Present" counts as reaching `current_year`; the same words in
/// prose do not. Spans outside `(0, 50]` are rejected.
pub(crate) fn infer_year_span(text: &str, current_year: i32) -> Option<f64> {
    let mut years: Vec<i32> = YEAR_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if years.is_empty() {
        return None;
    }
    if ONGOING_RANGE_RE.is_match(text) {
        years.push(current_year);
    }

    let earliest = *years.iter().min()?;
    let latest = *years.iter().max()?;
    let span = latest - earliest;
    (span > 0 && span <= MAX_EXPERIENCE_SPAN_YEARS).then_some(f64::from(span))
}

/// Splits a skills line on the usual list separators.
pub(crate) fn split_list_line(line: &str) -> impl Iterator<Item = &str> {
    line.split([',', ';', '|', '•', '·'])
        .map(|s| s.trim().trim_start_matches(['-', '*']).trim())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_email_first_token() {
        let text = "Jane Doe\njane.doe@Example.com | other@corp.io";
        assert_eq!(find_email(text).as_deref(), Some("jane.doe@example.com"));
    }

    #[test]
    fn test_find_email_lenient_spaced_at() {
        let text = "Contact: jane.doe @ example.com";
        assert_eq!(find_email(text), None);
        assert_eq!(
            find_email_lenient(text).as_deref(),
            Some("jane.doe@example.com")
        );
    }

    #[test]
    fn test_find_email_none() {
        assert_eq!(find_email_lenient("no contact details here"), None);
    }

    #[test]
    fn test_find_phone_prefers_indian_mobile() {
        let text = "Call 555-123-4567 or +91 9876543210";
        assert_eq!(find_phone(text).as_deref(), Some("+91 9876543210"));
    }

    #[test]
    fn test_find_phone_us_formats() {
        assert_eq!(
            find_phone("Phone 415.555.0134").as_deref(),
            Some("415.555.0134")
        );
        assert_eq!(
            find_phone("Phone (415) 555-0134").as_deref(),
            Some("(415) 555-0134")
        );
    }

    #[test]
    fn test_find_phone_international_fallback() {
        assert_eq!(
            find_phone("Tel +44 20 7946 0958").as_deref(),
            Some("+44 20 7946 0958")
        );
    }

    #[test]
    fn test_find_phone_ignores_year_ranges() {
        assert_eq!(find_phone("Acme Corp 2015 - 2019"), None);
    }

    #[test]
    fn test_find_linkedin_normalizes_scheme() {
        let text = "Profile: www.linkedin.com/in/jane-doe-42";
        assert_eq!(
            find_linkedin(text).as_deref(),
            Some("https://linkedin.com/in/jane-doe-42")
        );
    }

    #[test]
    fn test_find_location_single_line() {
        assert_eq!(
            find_location("Jane Doe\nSan Francisco, CA").as_deref(),
            Some("San Francisco, CA")
        );
    }

    #[test]
    fn test_plausible_name_rules() {
        assert!(is_plausible_name("Jane Doe"));
        assert!(!is_plausible_name("Jo"));
        assert!(!is_plausible_name("jane@example.com"));
        assert!(!is_plausible_name("Call 9876543210"));
        assert!(!is_plausible_name("12 34"));
        assert!(!is_plausible_name("RESUME"));
        assert!(!is_plausible_name(&"A".repeat(61)));
    }

    #[test]
    fn test_name_from_email_strips_digits_and_punctuation() {
        assert_eq!(
            name_from_email("john.doe92@example.com").as_deref(),
            Some("John Doe")
        );
        assert_eq!(
            name_from_email("MARY_ann-smith@x.io").as_deref(),
            Some("Mary Ann Smith")
        );
        assert_eq!(name_from_email("12345@x.io"), None);
    }

    #[test]
    fn test_experience_phrase_variants() {
        assert_eq!(find_experience_years("5 years of experience in Java"), Some(5.0));
        assert_eq!(find_experience_years("7+ years experience"), Some(7.0));
        assert_eq!(
            find_experience_years("3.5 yrs professional experience"),
            Some(3.5)
        );
        assert_eq!(find_experience_years("Founded 10 years ago"), None);
    }

    #[test]
    fn test_year_span_from_tokens() {
        let section = "Acme 2014 - 2017\nGlobex 2017 - 2021";
        assert_eq!(infer_year_span(section, 2026), Some(7.0));
    }

    #[test]
    fn test_year_span_counts_present_as_current_year() {
        let section = "Initech 2019 - Present";
        assert_eq!(infer_year_span(section, 2026), Some(7.0));
    }

    #[test]
    fn test_year_span_counts_now_and_current_range_ends() {
        assert_eq!(infer_year_span("Initech 2019 - Now", 2026), Some(7.0));
        assert_eq!(infer_year_span("Initech 2020 – current", 2026), Some(6.0));
        assert_eq!(infer_year_span("Initech 2021 to date", 2026), Some(5.0));
    }

    #[test]
    fn test_year_span_ignores_ongoing_words_in_prose() {
        let section = "Acme 2012 - 2014\nMaintained the current billing system\nShipped 40 releases to date";
        assert_eq!(infer_year_span(section, 2026), Some(2.0));
    }

    #[test]
    fn test_year_span_rejects_single_year_and_absurd_spans() {
        assert_eq!(infer_year_span("Graduated 2019", 2026), None);
        assert_eq!(infer_year_span("1950 and 2024", 2026), None);
        assert_eq!(infer_year_span("no years", 2026), None);
    }

    #[test]
    fn test_split_list_line_separators() {
        let parts: Vec<_> = split_list_line("Rust, Go; Python | SQL • Docker · - AWS").collect();
        assert_eq!(parts, vec!["Rust", "Go", "Python", "SQL", "Docker", "AWS"]);
    }
}
