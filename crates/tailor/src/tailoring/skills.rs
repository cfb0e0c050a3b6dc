//! Skill Matcher — pairs profile skills with JD requirement terms.
//!
//! Two entry points with deliberately different capability policies:
//! - `evaluate_skills` treats an unconfigured capability as a hard
//!   precondition failure and asks the capability for the matching;
//! - `map_skills` is the legacy heuristic mapper: pure, deterministic,
//!   never fails.
//!
//! The pipeline prefers the evaluator when the capability is configured and
//! degrades to the mapper otherwise. The two are intentionally NOT unified.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::PipelineError;
use crate::llm_client::prompts::json_system_prompt;
use crate::llm_client::{parse_fenced_json, TextRewriter};
use crate::models::profile::Skill;
use crate::tailoring::prompts::{SKILL_MATCH_PROMPT_TEMPLATE, SKILL_MATCH_SYSTEM};
use crate::tailoring::requirements::RequirementSet;
use crate::tailoring::terms::{ecosystem_related, normalize_term, tech_terms_match};

/// How a profile skill relates to a JD requirement term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Synonym,
    Ecosystem,
    Related,
    Covers,
}

/// One profile skill paired with one requirement term. Multiple matches may
/// reference the same skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMatch {
    pub skill: Skill,
    pub requirement: String,
    pub match_type: MatchType,
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillMapping {
    pub matched_skills: Vec<SkillMatch>,
    /// Deduplicated skills with at least one match, in profile order.
    pub selected_skills: Vec<Skill>,
    /// Normalized requirement terms with zero matches.
    pub coverage_gaps: Vec<String>,
}

// Heuristic confidence ladder: a required-keyword hit outranks a preferred one.
const REQUIRED_CONFIDENCE: [f64; 3] = [0.9, 0.85, 0.75]; // exact / synonym / ecosystem
const PREFERRED_CONFIDENCE: [f64; 3] = [0.7, 0.65, 0.6];

// ────────────────────────────────────────────────────────────────────────────
// Capability-gated evaluator
// ────────────────────────────────────────────────────────────────────────────

/// Wire row for the evaluator's response array.
#[derive(Debug, Deserialize)]
struct SkillMatchWire {
    skill: String,
    requirement: String,
    match_type: MatchType,
    confidence: f64,
    #[serde(default)]
    explanation: String,
}

/// Matches skills via the text-generation capability.
///
/// Hard precondition: the capability must be configured — this entry point
/// surfaces `PipelineError::Configuration` instead of degrading. Response rows
/// naming a skill not present in the profile are dropped silently (logged).
pub async fn evaluate_skills(
    skills: &[Skill],
    requirements: &RequirementSet,
    rewriter: &dyn TextRewriter,
) -> Result<SkillMapping, PipelineError> {
    if !rewriter.is_configured() {
        return Err(PipelineError::Configuration(
            "skill evaluation requires the text-generation capability".to_string(),
        ));
    }

    let prompt = build_skill_match_prompt(skills, requirements)
        .map_err(|e| PipelineError::Internal(anyhow::anyhow!("prompt serialization: {e}")))?;
    let raw = rewriter
        .rewrite(&prompt, &json_system_prompt(SKILL_MATCH_SYSTEM))
        .await?;
    let rows: Vec<SkillMatchWire> = parse_fenced_json(&raw)?;

    let mut matches = Vec::new();
    for row in rows {
        let Some(skill) = skills
            .iter()
            .find(|s| normalize_term(&s.name) == normalize_term(&row.skill))
        else {
            warn!("dropping match for unknown skill '{}'", row.skill);
            continue;
        };
        matches.push(SkillMatch {
            skill: skill.clone(),
            requirement: normalize_term(&row.requirement),
            match_type: row.match_type,
            confidence: row.confidence.clamp(0.0, 1.0),
            explanation: row.explanation,
        });
    }

    Ok(build_mapping(skills, matches, requirements))
}

/// Fills the skill-match template. Testable without a capability call.
pub fn build_skill_match_prompt(
    skills: &[Skill],
    requirements: &RequirementSet,
) -> Result<String, serde_json::Error> {
    let skills_json =
        serde_json::to_string(&skills.iter().map(|s| &s.name).collect::<Vec<_>>())?;
    let required_json = serde_json::to_string(&requirements.required_skills)?;
    let preferred_json = serde_json::to_string(&requirements.preferred_skills)?;
    Ok(SKILL_MATCH_PROMPT_TEMPLATE
        .replace("{skills_json}", &skills_json)
        .replace("{required_json}", &required_json)
        .replace("{preferred_json}", &preferred_json))
}

// ────────────────────────────────────────────────────────────────────────────
// Legacy heuristic mapper
// ────────────────────────────────────────────────────────────────────────────

/// Matches skills heuristically against the requirement terms.
///
/// Per skill: the required keywords are scanned for the best match tier
/// (exact beats synonym beats ecosystem) and the preferred list is consulted
/// only when no required keyword matched at any tier. Ties within a tier go
/// to the first keyword in set order. Pure and deterministic — never fails,
/// never calls the capability.
pub fn map_skills(skills: &[Skill], requirements: &RequirementSet) -> SkillMapping {
    let mut matches = Vec::new();

    for skill in skills {
        let required_hit = best_hit(&skill.name, &requirements.required_skills);

        let hit = required_hit
            .map(|(term, tier)| (term, tier, true))
            .or_else(|| {
                best_hit(&skill.name, &requirements.preferred_skills)
                    .map(|(term, tier)| (term, tier, false))
            });

        if let Some((term, (match_type, tier), is_required)) = hit {
            let confidence = if is_required {
                REQUIRED_CONFIDENCE[tier]
            } else {
                PREFERRED_CONFIDENCE[tier]
            };
            let bucket = if is_required { "required" } else { "preferred" };
            matches.push(SkillMatch {
                skill: skill.clone(),
                requirement: term.clone(),
                match_type,
                confidence,
                explanation: format!(
                    "'{}' is a {:?}-tier match for the {bucket} keyword '{term}'",
                    skill.name, match_type
                ),
            });
        }
    }

    build_mapping(skills, matches, requirements)
}

/// Scans every keyword in a requirement list and returns the lowest-tier hit.
/// `min_by_key` keeps the first keyword when two hit the same tier, so the
/// outcome is stable across runs.
fn best_hit<'a>(
    skill_name: &str,
    terms: &'a BTreeSet<String>,
) -> Option<(&'a String, (MatchType, usize))> {
    terms
        .iter()
        .filter_map(|term| classify(skill_name, term).map(|tier| (term, tier)))
        .min_by_key(|(_, (_, tier))| *tier)
}

/// Classifies a skill/term pair into (match type, confidence tier index), or
/// no match. Tier 0 = exact, 1 = synonym (alias spelling), 2 = ecosystem.
fn classify(skill_name: &str, term: &str) -> Option<(MatchType, usize)> {
    if normalize_term(skill_name) == normalize_term(term) {
        return Some((MatchType::Exact, 0));
    }
    if tech_terms_match(skill_name, term) {
        return Some((MatchType::Synonym, 1));
    }
    if ecosystem_related(skill_name, term) {
        return Some((MatchType::Ecosystem, 2));
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Shared mapping assembly
// ────────────────────────────────────────────────────────────────────────────

/// Builds the final mapping: deduplicated matched skills in profile order and
/// the coverage gaps (requirement terms no match covers).
fn build_mapping(
    skills: &[Skill],
    matches: Vec<SkillMatch>,
    requirements: &RequirementSet,
) -> SkillMapping {
    let selected_skills: Vec<Skill> = skills
        .iter()
        .filter(|s| {
            matches
                .iter()
                .any(|m| normalize_term(&m.skill.name) == normalize_term(&s.name))
        })
        .cloned()
        .collect();

    let coverage_gaps: Vec<String> = requirements
        .all_requirement_terms()
        .into_iter()
        .filter(|term| {
            !matches
                .iter()
                .any(|m| tech_terms_match(&m.requirement, term))
        })
        .collect();

    SkillMapping {
        matched_skills: matches,
        selected_skills,
        coverage_gaps,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
