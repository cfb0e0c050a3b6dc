//! Draft Assembler — merges adapted experience, selected skills, and
//! unmodified education into the final CV draft plus a coverage report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::profile::{Education, Experience, PersonalInfo, Skill};
use crate::tailoring::adapter::AdaptedContent;
use crate::tailoring::skills::{MatchType, SkillMapping};

/// The complete tailored CV draft. Education is always carried over
/// unmodified; only experience wording and skill ordering differ from the
/// master profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCv {
    pub personal: PersonalInfo,
    pub experiences: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub education: Vec<Education>,
}

/// Requirement coverage report: which JD terms the draft covers, covers
/// partially, or leaves as gaps, with a per-skill justification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub covered_requirements: Vec<String>,
    pub partially_covered: Vec<String>,
    pub gaps: Vec<String>,
    pub skill_justifications: BTreeMap<String, String>,
}

/// Human-readable category tag for a match's justification string.
fn category_tag(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::Exact | MatchType::Synonym => "[Direct Match]",
        MatchType::Ecosystem => "[Technology Ecosystem]",
        MatchType::Covers => "[Supports Responsibilities]",
        MatchType::Related => "[Related Experience]",
    }
}

/// Assembles the draft and computes the coverage summary.
///
/// Coverage: exact/synonym matches mark their requirement covered;
/// ecosystem/related/covers matches mark it partially covered. A term that is
/// both covered and partially covered counts as covered. Terms with no match
/// at all arrive as the mapping's coverage gaps.
pub fn assemble(
    personal: &PersonalInfo,
    adapted: &AdaptedContent,
    selected_skills: Vec<Skill>,
    education: &[Education],
    mapping: &SkillMapping,
) -> (DraftCv, CoverageSummary) {
    let mut covered: Vec<String> = Vec::new();
    let mut partial: Vec<String> = Vec::new();
    let mut justifications: BTreeMap<String, String> = BTreeMap::new();

    for m in &mapping.matched_skills {
        let bucket = match m.match_type {
            MatchType::Exact | MatchType::Synonym => &mut covered,
            _ => &mut partial,
        };
        if !bucket.contains(&m.requirement) {
            bucket.push(m.requirement.clone());
        }

        let justification = format!(
            "{} {} (confidence {:.2})",
            category_tag(m.match_type),
            m.explanation,
            m.confidence
        );
        // First (highest-priority) justification per skill wins
        justifications
            .entry(m.skill.name.clone())
            .or_insert(justification);
    }

    // A requirement fully covered by one skill is not also "partial"
    partial.retain(|term| !covered.contains(term));

    let summary = CoverageSummary {
        covered_requirements: covered,
        partially_covered: partial,
        gaps: mapping.coverage_gaps.clone(),
        skill_justifications: justifications,
    };

    let draft = DraftCv {
        personal: personal.clone(),
        experiences: adapted.experiences.clone(),
        skills: selected_skills,
        education: education.to_vec(),
    };

    (draft, summary)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
