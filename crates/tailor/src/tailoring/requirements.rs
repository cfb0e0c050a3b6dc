//! Requirement Extractor — turns raw job-description text into a structured
//! requirement set.
//!
//! Primary path asks the text-generation capability for a five-list JSON
//! extraction; any failure (unconfigured capability, transport error,
//! malformed response) falls back to the line-based heuristics silently.
//! Extraction never errors to the caller.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{parse_fenced_json, TextRewriter};
use crate::llm_client::prompts::json_system_prompt;
use crate::tailoring::prompts::{EXTRACTION_PROMPT_TEMPLATE, EXTRACTION_SYSTEM};
use crate::tailoring::terms::{
    normalize_term, tokenize, ACTION_VERBS, MULTI_WORD_TECH, PREFERRED_MARKERS, REQUIRED_MARKERS,
    SENIORITY_WORDS, SINGLE_WORD_TECH,
};

pub const MAX_RESPONSIBILITIES: usize = 10;
pub const MAX_SENIORITY_SIGNALS: usize = 5;

/// Structured requirements extracted from a job description.
/// Immutable once produced; every downstream stage reads, never writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementSet {
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    /// At most 10, in JD order.
    pub responsibilities: Vec<String>,
    pub domain_keywords: BTreeSet<String>,
    /// At most 5 distinct seniority words, in JD order.
    pub seniority_signals: Vec<String>,
}

/// Wire shape for the capability's extraction response. Lists instead of sets
/// because the model returns arrays; missing fields default to empty.
#[derive(Debug, Deserialize)]
struct RequirementSetWire {
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    preferred_skills: Vec<String>,
    #[serde(default)]
    responsibilities: Vec<String>,
    #[serde(default)]
    domain_keywords: Vec<String>,
    #[serde(default)]
    seniority_signals: Vec<String>,
}

impl RequirementSetWire {
    fn into_requirement_set(self) -> RequirementSet {
        let mut set = RequirementSet {
            required_skills: self.required_skills.iter().map(|s| normalize_term(s)).collect(),
            preferred_skills: self.preferred_skills.iter().map(|s| normalize_term(s)).collect(),
            responsibilities: self
                .responsibilities
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            domain_keywords: self.domain_keywords.iter().map(|s| normalize_term(s)).collect(),
            seniority_signals: self
                .seniority_signals
                .into_iter()
                .map(|s| normalize_term(&s))
                .filter(|s| !s.is_empty())
                .collect(),
        };
        set.required_skills.remove("");
        set.preferred_skills.remove("");
        set.domain_keywords.remove("");
        set.truncate_to_caps();
        set
    }
}

impl RequirementSet {
    fn truncate_to_caps(&mut self) {
        self.responsibilities.truncate(MAX_RESPONSIBILITIES);
        self.seniority_signals.dedup();
        self.seniority_signals.truncate(MAX_SENIORITY_SIGNALS);
    }

    /// Required ∪ preferred, normalized — the terms coverage is computed over.
    pub fn all_requirement_terms(&self) -> BTreeSet<String> {
        self.required_skills
            .union(&self.preferred_skills)
            .cloned()
            .collect()
    }
}

/// Extracts a `RequirementSet` from raw JD text.
///
/// Never errors: any internal failure degrades to `heuristic_extract`.
pub async fn extract_requirements(jd_text: &str, rewriter: &dyn TextRewriter) -> RequirementSet {
    if !rewriter.is_configured() {
        debug!("capability unconfigured, extracting requirements heuristically");
        return heuristic_extract(jd_text);
    }

    let prompt = build_extraction_prompt(jd_text);
    match rewriter
        .rewrite(&prompt, &json_system_prompt(EXTRACTION_SYSTEM))
        .await
    {
        Ok(raw) => match parse_fenced_json::<RequirementSetWire>(&raw) {
            Ok(wire) => wire.into_requirement_set(),
            Err(e) => {
                warn!("extraction response was not valid JSON ({e}), falling back to heuristics");
                heuristic_extract(jd_text)
            }
        },
        Err(e) => {
            warn!("extraction call failed ({e}), falling back to heuristics");
            heuristic_extract(jd_text)
        }
    }
}

/// Fills the extraction template. Kept separate so prompt construction is
/// testable without a capability call.
pub fn build_extraction_prompt(jd_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{jd_text}", jd_text)
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic fallback
// ────────────────────────────────────────────────────────────────────────────

/// Rule-based extraction over the JD's non-empty lines.
///
/// Each line is classified as a responsibility (contains an action verb),
/// or its technology terms land in required (the default) or preferred —
/// preferred is sticky once a nice-to-have marker appears, until a
/// required-phrasing line resets it. Terms that end up in neither bucket
/// become domain keywords.
pub fn heuristic_extract(jd_text: &str) -> RequirementSet {
    let mut required: BTreeSet<String> = BTreeSet::new();
    let mut preferred: BTreeSet<String> = BTreeSet::new();
    let mut responsibilities: Vec<String> = Vec::new();
    let mut all_terms: BTreeSet<String> = BTreeSet::new();

    let mut preferred_mode = false;

    for line in jd_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let lower = line.to_lowercase();
        let terms = extract_line_terms(&lower);
        all_terms.extend(terms.iter().cloned());

        if REQUIRED_MARKERS.iter().any(|m| lower.contains(m)) {
            preferred_mode = false;
        } else if PREFERRED_MARKERS.iter().any(|m| lower.contains(m)) {
            preferred_mode = true;
        }

        if is_responsibility_line(&lower) {
            responsibilities.push(line.to_string());
            continue;
        }

        if preferred_mode {
            preferred.extend(terms);
        } else {
            required.extend(terms);
        }
    }

    // Line classification found nothing — treat every extracted term as required.
    if required.is_empty() && preferred.is_empty() {
        required = all_terms.clone();
    }

    let domain_keywords: BTreeSet<String> = all_terms
        .difference(&required)
        .filter(|t| !preferred.contains(*t))
        .cloned()
        .collect();

    let mut set = RequirementSet {
        required_skills: required,
        preferred_skills: preferred,
        responsibilities,
        domain_keywords,
        seniority_signals: extract_seniority(jd_text),
    };
    set.truncate_to_caps();
    set
}

/// Extracts technology terms from a lowercased line using three methods:
/// parenthetical "(e.g., …)" hints, the multi-word list, the single-word list.
fn extract_line_terms(lower: &str) -> BTreeSet<String> {
    let mut terms = BTreeSet::new();

    for hint in parenthetical_hints(lower) {
        terms.insert(hint);
    }

    for mw in MULTI_WORD_TECH {
        if lower.contains(mw) {
            terms.insert((*mw).to_string());
        }
    }

    for token in tokenize(lower) {
        if SINGLE_WORD_TECH.contains(&token.as_str()) {
            terms.insert(token);
        }
    }

    terms
}

/// Terms listed inside "(e.g., …)" parentheticals. These are explicit hints
/// from the JD author and are kept even when not in the known lists.
fn parenthetical_hints(lower: &str) -> Vec<String> {
    let mut hints = Vec::new();
    let mut rest = lower;
    while let Some(open) = rest.find("(e.g") {
        let after = &rest[open..];
        let Some(close) = after.find(')') else { break };
        let inner = &after[..close];
        let inner = inner
            .trim_start_matches("(e.g.,")
            .trim_start_matches("(e.g.")
            .trim_start_matches("(e.g");
        for candidate in inner.split([',', ';']).flat_map(|p| p.split(" or ")) {
            let term = normalize_term(candidate.trim_start_matches("and "));
            if !term.is_empty() {
                hints.push(term);
            }
        }
        rest = &after[close..];
    }
    hints
}

fn is_responsibility_line(lower: &str) -> bool {
    tokenize(lower)
        .iter()
        .any(|token| ACTION_VERBS.contains(&token.as_str()))
}

/// Up to 5 distinct seniority words, in order of first appearance.
fn extract_seniority(jd_text: &str) -> Vec<String> {
    let tokens = tokenize(jd_text);
    let mut found: Vec<String> = Vec::new();
    for token in tokens {
        if SENIORITY_WORDS.contains(&token.as_str()) && !found.contains(&token) {
            found.push(token);
            if found.len() == MAX_SENIORITY_SIGNALS {
                break;
            }
        }
    }
    found
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
