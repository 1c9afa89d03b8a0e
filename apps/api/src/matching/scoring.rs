//! Compatibility scoring — pure functions from (candidate, requirement) to a `MatchResult`.
//!
//! Weights: skills 70%, experience 30%. A zero skill score forces a zero overall
//! score so that a job text with no recognizable skills never ranks anyone highly.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::models::{deserialize_years, sanitize_years};
use crate::matching::requirements::{ExperienceRequirement, JobRequirement, RequirementKind};
use crate::taxonomy::SkillTaxonomy;

const SKILL_WEIGHT: f64 = 0.7;
const EXPERIENCE_WEIGHT: f64 = 0.3;
/// Points lost per year below the required minimum.
const PENALTY_PER_MISSING_YEAR: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub skill_score: u32,
    pub experience_score: u32,
    pub overall_score: u32,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_reason: String,
    pub candidate_experience: f64,
    pub required_skills: Vec<String>,
    pub experience_requirement: ExperienceRequirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    pub score: u32,
    pub matching: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceMatch {
    pub score: u32,
    pub reason: String,
}

/// True when `outer` equals `inner` or contains it as a whole space-delimited phrase.
fn contains_phrase(outer: &str, inner: &str) -> bool {
    outer == inner || format!(" {outer} ").contains(&format!(" {inner} "))
}

fn phrase_equivalent(a: &str, b: &str) -> bool {
    contains_phrase(a, b) || contains_phrase(b, a)
}

/// Whether a candidate skill string satisfies a required skill, directly or via
/// any taxonomy variant of the required skill.
pub fn skills_equivalent(candidate_skill: &str, required: &str) -> bool {
    let candidate = candidate_skill.trim().to_lowercase();
    let required = required.trim().to_lowercase();
    if candidate.is_empty() || required.is_empty() {
        return false;
    }

    let via_variant = SkillTaxonomy::global()
        .variants(&required)
        .is_some_and(|variants| {
            variants
                .iter()
                .any(|v| phrase_equivalent(&candidate, &v.to_lowercase()))
        });
    via_variant || phrase_equivalent(&candidate, &required)
}

/// Candidate skill entries may be comma-separated lists ("React, Node.js").
fn split_candidate_skills(skills: &[String]) -> Vec<&str> {
    skills
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn compute_skill_match(candidate_skills: &[String], required: &[String]) -> SkillMatch {
    if required.is_empty() {
        return SkillMatch {
            score: 0,
            matching: Vec::new(),
            missing: Vec::new(),
        };
    }

    let candidate = split_candidate_skills(candidate_skills);
    if candidate.is_empty() {
        return SkillMatch {
            score: 0,
            matching: Vec::new(),
            missing: required.to_vec(),
        };
    }

    let (matching, missing): (Vec<String>, Vec<String>) = required
        .iter()
        .cloned()
        .partition(|req| candidate.iter().any(|cs| skills_equivalent(cs, req)));

    let score = (100.0 * matching.len() as f64 / required.len() as f64).round() as u32;
    SkillMatch {
        score,
        matching,
        missing,
    }
}

fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.0}")
    } else {
        format!("{years}")
    }
}

fn deficit_score(min: f64, years: f64) -> u32 {
    (100.0 - PENALTY_PER_MISSING_YEAR * (min - years))
        .max(0.0)
        .round() as u32
}

pub fn compute_experience_match(years: f64, requirement: &ExperienceRequirement) -> ExperienceMatch {
    let years = sanitize_years(years);
    let (y, min) = (format_years(years), format_years(requirement.min));

    match (requirement.kind, requirement.max) {
        (RequirementKind::Minimum, _) if years >= requirement.min => ExperienceMatch {
            score: 100,
            reason: format!("Meets minimum ({y} years >= {min} years)"),
        },
        (RequirementKind::Range, Some(max)) if years >= requirement.min && years <= max => {
            ExperienceMatch {
                score: 100,
                reason: format!(
                    "Within range ({y} years in {min}-{} years)",
                    format_years(max)
                ),
            }
        }
        (RequirementKind::Range, Some(_)) if years > requirement.min => ExperienceMatch {
            score: 100,
            reason: format!("Exceeds requirement ({y} years)"),
        },
        (RequirementKind::Minimum, _) | (RequirementKind::Range, Some(_)) => ExperienceMatch {
            score: deficit_score(requirement.min, years),
            reason: format!(
                "{} year(s) below minimum",
                format_years(((requirement.min - years) * 10.0).round() / 10.0)
            ),
        },
        (RequirementKind::None, _) | (RequirementKind::Range, None) => ExperienceMatch {
            score: 100,
            reason: "No experience requirement specified".to_string(),
        },
    }
}

pub fn compute_overall(skill_score: u32, experience_score: u32) -> u32 {
    if skill_score == 0 {
        return 0;
    }
    (SKILL_WEIGHT * f64::from(skill_score) + EXPERIENCE_WEIGHT * f64::from(experience_score))
        .round() as u32
}

/// Scores one candidate against a mined requirement.
pub fn score(
    candidate_skills: &[String],
    candidate_experience: f64,
    requirement: &JobRequirement,
) -> MatchResult {
    let years = sanitize_years(candidate_experience);
    let required: Vec<String> = requirement.required_skills.iter().cloned().collect();
    let experience_requirement = requirement.experience_requirement.clone().sanitized();

    let skills = compute_skill_match(candidate_skills, &required);
    let experience = compute_experience_match(years, &experience_requirement);

    MatchResult {
        skill_score: skills.score,
        experience_score: experience.score,
        overall_score: compute_overall(skills.score, experience.score),
        matching_skills: skills.matching,
        missing_skills: skills.missing,
        experience_reason: experience.reason,
        candidate_experience: years,
        required_skills: required,
        experience_requirement,
        error: None,
    }
}

/// [`score`] that never panics: a panic becomes a zeroed result carrying `error`.
pub fn score_safely(
    candidate_skills: &[String],
    candidate_experience: f64,
    requirement: &JobRequirement,
) -> MatchResult {
    guarded(candidate_experience, requirement, || {
        score(candidate_skills, candidate_experience, requirement)
    })
}

fn guarded<F>(candidate_experience: f64, requirement: &JobRequirement, f: F) -> MatchResult
where
    F: FnOnce() -> MatchResult,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!("Scoring panicked: {message}");
        zeroed(candidate_experience, requirement, message)
    })
}

fn zeroed(candidate_experience: f64, requirement: &JobRequirement, error: String) -> MatchResult {
    MatchResult {
        skill_score: 0,
        experience_score: 0,
        overall_score: 0,
        matching_skills: Vec::new(),
        missing_skills: Vec::new(),
        experience_reason: String::new(),
        candidate_experience: sanitize_years(candidate_experience),
        required_skills: requirement.required_skills.iter().cloned().collect(),
        experience_requirement: requirement.experience_requirement.clone().sanitized(),
        error: Some(format!("scoring failed: {error}")),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateInput {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_years")]
    pub experience_years: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: Uuid,
    pub name: Option<String>,
    pub result: MatchResult,
}

/// Scores every candidate and orders them: overall desc, skill desc, id asc.
pub fn rank_candidates(
    requirement: &JobRequirement,
    candidates: Vec<CandidateInput>,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|c| RankedCandidate {
            result: score_safely(&c.skills, c.experience_years, requirement),
            candidate_id: c.id,
            name: c.name,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.result
            .overall_score
            .cmp(&a.result.overall_score)
            .then_with(|| b.result.skill_score.cmp(&a.result.skill_score))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    ranked
}
