//! Content Adapter — rewords selected text toward JD terminology without ever
//! inventing facts.
//!
//! Every non-empty description and highlight in the selection is sent through
//! the text-generation capability with the fact-preservation instruction and a
//! character budget. A rewrite is discarded (original kept) when it exceeds
//! the budget beyond tolerance, loses too much content, or the call fails.
//! Technologies, dates, and company names are never rewritten. Adaptation
//! failure is never fatal to the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::prompts::FACT_PRESERVATION_INSTRUCTION;
use crate::llm_client::TextRewriter;
use crate::models::profile::Experience;
use crate::tailoring::prompts::ADAPT_PROMPT_TEMPLATE;
use crate::tailoring::requirements::RequirementSet;
use crate::tailoring::selector::SelectionResult;
use crate::tailoring::terms::strip_html;

pub const DESCRIPTION_BUDGET: usize = 280;
pub const HIGHLIGHT_BUDGET: usize = 200;
/// A rewrite may exceed its budget by this many characters before being
/// discarded.
pub const BUDGET_TOLERANCE: usize = 20;
/// A rewrite shorter than this fraction of the original likely dropped
/// content and is discarded.
pub const MIN_LENGTH_RATIO: f64 = 0.3;

/// Selected experiences with text fields possibly reworded, plus a record of
/// which fields changed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptedContent {
    pub experiences: Vec<Experience>,
    /// Field path (keyed by experience id) → reason the field changed.
    pub adaptation_notes: BTreeMap<String, String>,
}

/// Rewords every non-empty description and highlight in the selection.
///
/// With an unconfigured capability this is a pass-through: the selection's
/// text is kept verbatim. Per-unit failures also keep that unit's original
/// text — the worst outcome of any adaptation failure is un-reworded text.
pub async fn adapt_content(
    selection: &SelectionResult,
    requirements: &RequirementSet,
    rewriter: &dyn TextRewriter,
    additional_context: Option<&str>,
) -> AdaptedContent {
    let mut experiences = selection.experiences.clone();
    let mut notes = BTreeMap::new();

    if !rewriter.is_configured() {
        debug!("capability unconfigured; keeping selected text verbatim");
        return AdaptedContent {
            experiences,
            adaptation_notes: notes,
        };
    }

    let terminology = requirement_terminology(requirements);

    for experience in &mut experiences {
        let exp_id = experience.id;

        if let Some(rewritten) = rewrite_unit(
            rewriter,
            &experience.description,
            DESCRIPTION_BUDGET,
            &terminology,
            additional_context,
        )
        .await
        {
            experience.description = rewritten;
            notes.insert(
                format!("{exp_id}.description"),
                "reworded toward role terminology".to_string(),
            );
        }

        for (p_idx, project) in experience.projects.iter_mut().enumerate() {
            if let Some(rewritten) = rewrite_unit(
                rewriter,
                &project.description,
                DESCRIPTION_BUDGET,
                &terminology,
                additional_context,
            )
            .await
            {
                project.description = rewritten;
                notes.insert(
                    format!("{exp_id}.project[{p_idx}].description"),
                    "reworded toward role terminology".to_string(),
                );
            }

            for (h_idx, highlight) in project.highlights.iter_mut().enumerate() {
                if let Some(rewritten) = rewrite_unit(
                    rewriter,
                    highlight,
                    HIGHLIGHT_BUDGET,
                    &terminology,
                    additional_context,
                )
                .await
                {
                    *highlight = rewritten;
                    notes.insert(
                        format!("{exp_id}.project[{p_idx}].highlight[{h_idx}]"),
                        "reworded toward role terminology".to_string(),
                    );
                }
            }
        }
    }

    AdaptedContent {
        experiences,
        adaptation_notes: notes,
    }
}

/// Rewrites one text unit. Returns `None` when the unit is empty, the call
/// fails, or the rewrite violates a content-policy check — the caller keeps
/// the original in all of those cases.
async fn rewrite_unit(
    rewriter: &dyn TextRewriter,
    original: &str,
    budget: usize,
    terminology: &str,
    additional_context: Option<&str>,
) -> Option<String> {
    if original.trim().is_empty() {
        return None;
    }

    let prompt = build_adapt_prompt(original, budget, terminology, additional_context);
    match rewriter.rewrite(&prompt, FACT_PRESERVATION_INSTRUCTION).await {
        Ok(candidate) => accept_rewrite(original, &candidate, budget),
        Err(e) => {
            warn!("rewrite failed ({e}); keeping original text");
            None
        }
    }
}

/// Content-policy validation: budget (HTML-stripped, with tolerance) and
/// minimum retained length. Violations are resolved by keeping the original,
/// never propagated.
fn accept_rewrite(original: &str, candidate: &str, budget: usize) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let visible_len = strip_html(candidate).chars().count();
    if visible_len > budget + BUDGET_TOLERANCE {
        warn!(
            "rewrite discarded: {visible_len} chars exceeds budget {budget} (+{BUDGET_TOLERANCE})"
        );
        return None;
    }

    let original_len = original.trim().chars().count();
    if (candidate.chars().count() as f64) < original_len as f64 * MIN_LENGTH_RATIO {
        warn!("rewrite discarded: likely dropped content (too short)");
        return None;
    }

    Some(candidate.to_string())
}

/// The JD vocabulary offered to the rewriter: required, preferred, and domain
/// terms, comma-joined.
fn requirement_terminology(requirements: &RequirementSet) -> String {
    requirements
        .required_skills
        .iter()
        .chain(requirements.preferred_skills.iter())
        .chain(requirements.domain_keywords.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fills the adaptation template. Testable without a capability call.
pub fn build_adapt_prompt(
    original: &str,
    budget: usize,
    terminology: &str,
    additional_context: Option<&str>,
) -> String {
    let context_block = match additional_context {
        Some(ctx) if !ctx.trim().is_empty() => {
            format!("ADDITIONAL CONTEXT from the caller:\n{}\n", ctx.trim())
        }
        _ => String::new(),
    };
    ADAPT_PROMPT_TEMPLATE
        .replace("{original_text}", original)
        .replace("{terminology}", terminology)
        .replace("{budget}", &budget.to_string())
        .replace("{additional_context}", &context_block)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
