//! Skill taxonomy — canonical skill names and the textual variants that stand for them.
//!
//! The table is static configuration data compiled once per process. Every lookup is
//! case-insensitive and word-boundary aware: a variant never matches inside a longer
//! word, so `go` does not fire on "going" and `r` does not fire on "research".

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

/// Canonical skill → variants. A variant string belongs to exactly one canonical skill.
const SKILL_TABLE: &[(&str, &[&str])] = &[
    // Programming languages
    ("javascript", &["javascript", "js", "ecmascript", "es6", "es2015"]),
    ("python", &["python", "python3"]),
    ("java", &["java", "jdk", "jvm", "hibernate"]),
    ("typescript", &["typescript", "ts"]),
    ("c++", &["c++", "cpp", "cplusplus"]),
    ("c#", &["c#", "csharp", ".net", "dotnet"]),
    ("php", &["php", "laravel", "symfony", "wordpress"]),
    ("ruby", &["ruby", "rails", "ruby on rails"]),
    ("go", &["go", "golang"]),
    ("rust", &["rust"]),
    ("swift", &["swift", "ios"]),
    ("kotlin", &["kotlin", "android"]),
    ("scala", &["scala"]),
    ("r", &["r", "r programming"]),
    // Frontend
    ("react", &["react", "reactjs", "react.js", "react native"]),
    ("angular", &["angular", "angularjs", "angular2"]),
    ("vue", &["vue", "vuejs", "vue.js", "nuxt"]),
    ("html", &["html", "html5"]),
    ("css", &["css", "css3", "scss", "sass"]),
    ("jquery", &["jquery"]),
    ("bootstrap", &["bootstrap"]),
    ("tailwind", &["tailwind", "tailwindcss"]),
    // Backend
    ("node", &["node", "nodejs", "node.js", "express", "expressjs"]),
    ("django", &["django"]),
    ("flask", &["flask"]),
    ("fastapi", &["fastapi"]),
    ("spring", &["spring", "springboot", "spring boot"]),
    ("asp.net", &["asp.net", "asp.net core"]),
    // Databases
    (
        "sql",
        &["sql", "mysql", "postgresql", "postgres", "mssql", "oracle", "sqlite"],
    ),
    ("mongodb", &["mongodb", "mongo", "nosql"]),
    ("redis", &["redis"]),
    ("elasticsearch", &["elasticsearch", "elastic"]),
    ("cassandra", &["cassandra"]),
    ("dynamodb", &["dynamodb"]),
    // Cloud & DevOps
    (
        "aws",
        &["aws", "amazon web services", "ec2", "s3", "lambda", "cloudformation"],
    ),
    ("azure", &["azure", "microsoft azure"]),
    ("gcp", &["gcp", "google cloud", "google cloud platform"]),
    ("docker", &["docker", "container", "containerization"]),
    ("kubernetes", &["kubernetes", "k8s", "container orchestration"]),
    ("jenkins", &["jenkins", "ci/cd"]),
    ("terraform", &["terraform", "infrastructure as code", "iac"]),
    ("ansible", &["ansible"]),
    (
        "git",
        &["git", "github", "gitlab", "bitbucket", "version control"],
    ),
    // Data science & ML
    (
        "machine learning",
        &["machine learning", "ml", "ai", "artificial intelligence"],
    ),
    ("deep learning", &["deep learning", "neural network", "cnn", "rnn"]),
    ("tensorflow", &["tensorflow", "tf"]),
    ("pytorch", &["pytorch"]),
    ("pandas", &["pandas"]),
    ("numpy", &["numpy"]),
    ("scikit-learn", &["scikit-learn", "sklearn"]),
    // Testing
    ("jest", &["jest"]),
    ("mocha", &["mocha"]),
    ("junit", &["junit"]),
    ("selenium", &["selenium", "automation testing"]),
    ("cypress", &["cypress", "e2e testing"]),
    // Other
    ("agile", &["agile", "scrum", "kanban"]),
    ("rest", &["rest", "restful", "rest api", "api"]),
    ("graphql", &["graphql", "gql"]),
    (
        "microservices",
        &["microservices", "microservice", "microservice architecture"],
    ),
    ("linux", &["linux", "unix"]),
    ("bash", &["bash", "shell", "shell scripting"]),
];

static TAXONOMY: LazyLock<SkillTaxonomy> = LazyLock::new(|| SkillTaxonomy::from_table(SKILL_TABLE));

struct SkillEntry {
    canonical: &'static str,
    variants: &'static [&'static str],
    patterns: Vec<Regex>,
}

/// Read-only canonical-skill knowledge base.
pub struct SkillTaxonomy {
    entries: Vec<SkillEntry>,
    by_variant: HashMap<String, &'static str>,
}

impl SkillTaxonomy {
    /// The process-wide taxonomy, compiled on first use.
    pub fn global() -> &'static SkillTaxonomy {
        &TAXONOMY
    }

    fn from_table(table: &'static [(&'static str, &'static [&'static str])]) -> Self {
        let mut entries = Vec::with_capacity(table.len());
        let mut by_variant = HashMap::new();

        for &(canonical, variants) in table {
            let patterns = variants
                .iter()
                .filter_map(|variant| match boundary_pattern(variant) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        error!("Skipping skill variant '{variant}': {e}");
                        None
                    }
                })
                .collect();

            by_variant.insert(canonical.to_string(), canonical);
            for variant in variants {
                by_variant.insert(variant.to_lowercase(), canonical);
            }

            entries.push(SkillEntry {
                canonical,
                variants,
                patterns,
            });
        }

        Self {
            entries,
            by_variant,
        }
    }

    pub fn canonical_skills(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.canonical)
    }

    /// Variants of a canonical skill, or `None` when the skill is not in the table.
    pub fn variants(&self, canonical: &str) -> Option<&'static [&'static str]> {
        self.entry(canonical).map(|e| e.variants)
    }

    /// True when any variant of `canonical` occurs in `text` as a whole token.
    pub fn is_variant_of(&self, canonical: &str, text: &str) -> bool {
        self.entry(canonical)
            .map(|e| e.patterns.iter().any(|re| re.is_match(text)))
            .unwrap_or(false)
    }

    /// All canonical skills with at least one variant present in `text`.
    pub fn scan_text(&self, text: &str) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|e| e.patterns.iter().any(|re| re.is_match(text)))
            .map(|e| e.canonical.to_string())
            .collect()
    }

    /// Resolves a term that is exactly a known variant (ignoring case and
    /// surrounding whitespace) to its canonical name.
    pub fn canonical_of(&self, term: &str) -> Option<&'static str> {
        self.by_variant.get(term.trim().to_lowercase().as_str()).copied()
    }

    fn entry(&self, canonical: &str) -> Option<&SkillEntry> {
        let key = canonical.trim().to_lowercase();
        self.entries.iter().find(|e| e.canonical == key)
    }
}

/// Builds a case-insensitive pattern matching `term` only when it is not flanked by
/// a letter, digit or underscore. Works for terms that begin or end with symbols
/// (`c++`, `.net`), where a plain `\b` anchor would never match.
pub fn boundary_pattern(term: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}_]){}(?:$|[^\p{{L}}\p{{N}}_])",
        regex::escape(term.trim())
    ))
}

/// Pattern-free equivalent of [`boundary_pattern`] for ad-hoc terms (corpus skills,
/// heuristic keywords). Both arguments are compared case-insensitively.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle.as_str()).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
