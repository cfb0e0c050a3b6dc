//! Content Selector — scores and ranks experiences, nested projects, and
//! highlights by relevance to the requirement set, truncating to bounded
//! counts.
//!
//! Three-level top-K selection: top-N experiences (default 4), top-2 projects
//! per kept experience, top-3 highlights per kept project. An experience can
//! survive with a low-scoring highlight trimmed out rather than being dropped
//! entirely. Ties always preserve original profile order (stable sort).

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::{Experience, Project, Skill};
use crate::tailoring::requirements::RequirementSet;
use crate::tailoring::terms::{ecosystem_related, normalize_term, tech_terms_match, tokenize};

pub const DEFAULT_MAX_EXPERIENCES: usize = 4;
pub const MAX_PROJECTS_PER_EXPERIENCE: usize = 2;
pub const MAX_HIGHLIGHTS_PER_PROJECT: usize = 3;
pub const MAX_SELECTED_SKILLS: usize = 18;
const FALLBACK_SKILL_COUNT: usize = 10;

// Keyword-overlap weights. Any required hit must outrank the best possible
// single preferred hit plus the recency bonus, so required-overlap units rank
// above preferred-only units.
const REQUIRED_TEXT_WEIGHT: f64 = 2.0;
const PREFERRED_TEXT_WEIGHT: f64 = 1.0;
const REQUIRED_TECH_BONUS: f64 = 1.5;
const PREFERRED_TECH_BONUS: f64 = 0.75;
const MAX_RECENCY_BONUS: f64 = 0.25;
const RECENCY_HALF_LIFE_MONTHS: f64 = 18.0;

/// The narrower target the legacy selection path works against: keyword sets
/// plus responsibility lines, without the rest of the requirement set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSpec {
    pub required_keywords: BTreeSet<String>,
    pub preferred_keywords: BTreeSet<String>,
    pub responsibilities: Vec<String>,
}

impl TargetSpec {
    pub fn from_requirements(requirements: &RequirementSet) -> Self {
        Self {
            required_keywords: requirements.required_skills.clone(),
            preferred_keywords: requirements.preferred_skills.clone(),
            responsibilities: requirements.responsibilities.clone(),
        }
    }
}

/// A pruned copy of the profile's experience list, ordered by descending
/// relevance, plus any selection warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub experiences: Vec<Experience>,
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores one text unit: weighted keyword overlap (required above preferred),
/// a bonus per associated technology that matches a keyword, and a small
/// recency bonus decaying with the unit's start-date age.
pub fn score_item(
    text: &str,
    technologies: &[&str],
    start_date: Option<NaiveDate>,
    target: &TargetSpec,
) -> f64 {
    let tokens = tokenize(text);
    let lower = text.to_lowercase();
    let mut score = 0.0;

    for keyword in &target.required_keywords {
        if keyword_in_text(keyword, &tokens, &lower) {
            score += REQUIRED_TEXT_WEIGHT;
        }
    }
    for keyword in &target.preferred_keywords {
        if keyword_in_text(keyword, &tokens, &lower) {
            score += PREFERRED_TEXT_WEIGHT;
        }
    }

    for tech in technologies {
        if target
            .required_keywords
            .iter()
            .any(|kw| tech_terms_match(tech, kw))
        {
            score += REQUIRED_TECH_BONUS;
        } else if target
            .preferred_keywords
            .iter()
            .any(|kw| tech_terms_match(tech, kw))
        {
            score += PREFERRED_TECH_BONUS;
        }
    }

    score + recency_bonus(start_date)
}

/// Whole-token keyword match so "java" never scores text that only mentions
/// "javascript". Multi-word keywords fall back to a substring check since they
/// never survive tokenization whole.
fn keyword_in_text(keyword: &str, tokens: &[String], lower_text: &str) -> bool {
    if keyword.contains(char::is_whitespace) {
        return lower_text.contains(&keyword.to_lowercase());
    }
    tokens.iter().any(|token| tech_terms_match(token, keyword))
}

/// Bonus up to `MAX_RECENCY_BONUS`, halving every 18 months of start-date age.
/// Unknown start dates get no bonus. Deliberately smaller than every keyword
/// weight so recency alone never outranks relevance.
fn recency_bonus(start_date: Option<NaiveDate>) -> f64 {
    let Some(start) = start_date else { return 0.0 };
    let now = Utc::now().naive_utc().date();
    let months = months_between(start, now);
    if months <= 0.0 {
        return MAX_RECENCY_BONUS;
    }
    MAX_RECENCY_BONUS * (0.5_f64).powf(months / RECENCY_HALF_LIFE_MONTHS)
}

fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}

/// Sorts indices by descending score, ties broken by original order.
fn rank_by_score(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

// ────────────────────────────────────────────────────────────────────────────
// Experience selection
// ────────────────────────────────────────────────────────────────────────────

/// Three-level top-K selection over experiences → projects → highlights.
///
/// Zero-experience profiles return an empty selection plus an explicit
/// warning, never an error.
pub fn select_content(
    experiences: &[Experience],
    target: &TargetSpec,
    max_experiences: usize,
) -> SelectionResult {
    if experiences.is_empty() {
        return SelectionResult {
            experiences: Vec::new(),
            warnings: vec!["profile has no work experience; the draft will omit the experience section".to_string()],
        };
    }

    let scores: Vec<f64> = experiences
        .iter()
        .map(|exp| {
            score_item(
                &exp.combined_text(),
                &exp.all_technologies(),
                exp.start_date,
                target,
            )
        })
        .collect();

    let kept: Vec<Experience> = rank_by_score(&scores)
        .into_iter()
        .take(max_experiences)
        .map(|idx| prune_experience(&experiences[idx], target))
        .collect();

    SelectionResult {
        experiences: kept,
        warnings: Vec::new(),
    }
}

/// Copies an experience keeping only its top-2 projects, each with its top-3
/// highlights. The original is never mutated.
fn prune_experience(experience: &Experience, target: &TargetSpec) -> Experience {
    let project_scores: Vec<f64> = experience
        .projects
        .iter()
        .map(|p| {
            let text = format!("{} {} {}", p.name, p.description, p.highlights.join(" "));
            let techs: Vec<&str> = p.technologies.iter().map(String::as_str).collect();
            score_item(&text, &techs, experience.start_date, target)
        })
        .collect();

    let projects: Vec<Project> = rank_by_score(&project_scores)
        .into_iter()
        .take(MAX_PROJECTS_PER_EXPERIENCE)
        .map(|idx| prune_project(&experience.projects[idx], target))
        .collect();

    Experience {
        projects,
        ..experience.clone()
    }
}

fn prune_project(project: &Project, target: &TargetSpec) -> Project {
    let highlight_scores: Vec<f64> = project
        .highlights
        .iter()
        .map(|h| score_item(h, &[], None, target))
        .collect();

    let highlights: Vec<String> = rank_by_score(&highlight_scores)
        .into_iter()
        .take(MAX_HIGHLIGHTS_PER_PROJECT)
        .map(|idx| project.highlights[idx].clone())
        .collect();

    Project {
        highlights,
        ..project.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill selection
// ────────────────────────────────────────────────────────────────────────────

/// Scores each profile skill by a weighted sum:
/// 40% exact/synonym match to required keywords, 15% to preferred,
/// 25% ecosystem or word overlap, 10% responsibility-line vocabulary,
/// 10% appearance in already-selected experience text.
///
/// Keeps skills scoring above zero (capped at 18); if nothing scores, falls
/// back to the first 10 profile skills — a profile with skills never yields an
/// empty skill list.
pub fn select_skills(
    skills: &[Skill],
    target: &TargetSpec,
    selected_experiences: &[Experience],
) -> Vec<Skill> {
    if skills.is_empty() {
        return Vec::new();
    }

    let responsibility_vocab: BTreeSet<String> = target
        .responsibilities
        .iter()
        .flat_map(|r| tokenize(r))
        .collect();

    let experience_text = selected_experiences
        .iter()
        .map(|e| e.combined_text())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let scores: Vec<f64> = skills
        .iter()
        .map(|skill| {
            let name = normalize_term(&skill.name);
            let mut score = 0.0;

            if target
                .required_keywords
                .iter()
                .any(|kw| tech_terms_match(&name, kw))
            {
                score += 0.40;
            }
            if target
                .preferred_keywords
                .iter()
                .any(|kw| tech_terms_match(&name, kw))
            {
                score += 0.15;
            }

            let all_keywords = target
                .required_keywords
                .iter()
                .chain(target.preferred_keywords.iter());
            let name_tokens = tokenize(&name);
            if all_keywords.clone().any(|kw| ecosystem_related(&name, kw))
                || all_keywords
                    .clone()
                    .any(|kw| tokenize(kw).iter().any(|t| name_tokens.contains(t)))
            {
                score += 0.25;
            }

            if name_tokens.iter().any(|t| responsibility_vocab.contains(t)) {
                score += 0.10;
            }
            if experience_text.contains(&name) {
                score += 0.10;
            }

            score
        })
        .collect();

    let ranked: Vec<&Skill> = rank_by_score(&scores)
        .into_iter()
        .filter(|&idx| scores[idx] > 0.0)
        .take(MAX_SELECTED_SKILLS)
        .map(|idx| &skills[idx])
        .collect();

    if ranked.is_empty() {
        // No overlap with the JD at all — keep the profile's leading skills
        // rather than emitting an empty section.
        return skills.iter().take(FALLBACK_SKILL_COUNT).cloned().collect();
    }

    ranked.into_iter().cloned().collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn target(required: &[&str], preferred: &[&str]) -> TargetSpec {
        TargetSpec {
            required_keywords: required.iter().map(|s| s.to_string()).collect(),
            preferred_keywords: preferred.iter().map(|s| s.to_string()).collect(),
            responsibilities: Vec::new(),
        }
    }

    fn make_experience(description: &str, technologies: &[&str]) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            description: description.to_string(),
            technologies: technologies.iter().map(|s| s.to_string()).collect(),
            projects: Vec::new(),
            start_date: None,
            end_date: None,
        }
    }

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            category: "technical".to_string(),
        }
    }

    #[test]
    fn test_required_overlap_ranks_above_preferred_only() {
        let t = target(&["python"], &["kafka"]);
        let required_hit = score_item("built python services", &[], None, &t);
        let preferred_hit = score_item("operated kafka clusters", &[], None, &t);
        let no_hit = score_item("wrote documentation", &[], None, &t);
        assert!(required_hit > preferred_hit);
        assert!(preferred_hit > no_hit);
    }

    #[test]
    fn test_keyword_matches_whole_tokens_not_substrings() {
        let t = target(&["java"], &[]);
        let javascript_only = score_item("Built the frontend in JavaScript", &[], None, &t);
        let java_text = score_item("Built backend services in Java", &[], None, &t);
        assert!((javascript_only - 0.0).abs() < f64::EPSILON);
        assert!(java_text >= REQUIRED_TEXT_WEIGHT);
    }

    #[test]
    fn test_multi_word_keyword_matches_phrase() {
        let t = target(&["machine learning"], &[]);
        let s = score_item("Deployed machine learning models to production", &[], None, &t);
        assert!(s >= REQUIRED_TEXT_WEIGHT);
    }

    #[test]
    fn test_technology_bonus_applies_via_terms_match() {
        let t = target(&["postgres"], &[]);
        // "PostgreSQL" matches the "postgres" keyword through the alias group
        let with_tech = score_item("stored data", &["PostgreSQL"], None, &t);
        let without = score_item("stored data", &[], None, &t);
        assert!(with_tech > without);
    }

    #[test]
    fn test_recency_bonus_never_outranks_relevance() {
        let t = target(&[], &["kafka"]);
        let recent_irrelevant = score_item(
            "wrote documentation",
            &[],
            Utc::now().naive_utc().date().into(),
            &t,
        );
        let old_relevant = score_item(
            "operated kafka clusters",
            &[],
            NaiveDate::from_ymd_opt(2012, 1, 1),
            &t,
        );
        assert!(old_relevant > recent_irrelevant);
    }

    #[test]
    fn test_selection_keeps_top_n_and_orders_by_score() {
        let t = target(&["python"], &[]);
        let experiences = vec![
            make_experience("wrote documentation", &[]),
            make_experience("built python pipelines", &["Python"]),
            make_experience("more documentation", &[]),
        ];
        let result = select_content(&experiences, &t, 2);
        assert_eq!(result.experiences.len(), 2);
        assert!(result.experiences[0].description.contains("python"));
    }

    #[test]
    fn test_selection_is_deterministic_and_ties_keep_profile_order() {
        let t = target(&[], &[]);
        let experiences = vec![
            make_experience("first role", &[]),
            make_experience("second role", &[]),
            make_experience("third role", &[]),
        ];
        let a = select_content(&experiences, &t, 3);
        let b = select_content(&experiences, &t, 3);
        let order_a: Vec<&str> = a.experiences.iter().map(|e| e.description.as_str()).collect();
        let order_b: Vec<&str> = b.experiences.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(order_a, order_b, "selection must be idempotent");
        assert_eq!(order_a, vec!["first role", "second role", "third role"]);
    }

    #[test]
    fn test_empty_profile_returns_warning_not_error() {
        let result = select_content(&[], &target(&["python"], &[]), 4);
        assert!(result.experiences.is_empty());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_projects_pruned_to_two_and_highlights_to_three() {
        let t = target(&["python"], &[]);
        let mut exp = make_experience("python work", &[]);
        exp.projects = (0..4)
            .map(|i| Project {
                name: format!("project {i}"),
                description: if i == 2 { "python heavy".to_string() } else { "misc".to_string() },
                highlights: (0..5).map(|j| format!("highlight {j}")).collect(),
                technologies: Vec::new(),
            })
            .collect();

        let result = select_content(&[exp], &t, 4);
        let kept = &result.experiences[0];
        assert_eq!(kept.projects.len(), MAX_PROJECTS_PER_EXPERIENCE);
        assert_eq!(kept.projects[0].name, "project 2", "relevant project first");
        for project in &kept.projects {
            assert_eq!(project.highlights.len(), MAX_HIGHLIGHTS_PER_PROJECT);
        }
    }

    #[test]
    fn test_experience_survives_with_trimmed_highlights() {
        // An experience is retained even when its weakest highlights are cut.
        let t = target(&["rust"], &[]);
        let mut exp = make_experience("rust systems", &["Rust"]);
        exp.projects = vec![Project {
            name: "engine".to_string(),
            description: "rust engine".to_string(),
            highlights: vec![
                "rewrote the rust scheduler".to_string(),
                "tidied the wiki".to_string(),
                "renamed variables".to_string(),
                "updated copyright years".to_string(),
            ],
            technologies: vec!["Rust".to_string()],
        }];
        let result = select_content(&[exp], &t, 4);
        let highlights = &result.experiences[0].projects[0].highlights;
        assert_eq!(highlights.len(), 3);
        assert_eq!(highlights[0], "rewrote the rust scheduler");
    }

    #[test]
    fn test_skill_ranking_python_django_above_react() {
        let t = target(&["python", "django"], &[]);
        let skills = vec![skill("Python"), skill("Django"), skill("React")];
        let selected = select_skills(&skills, &t, &[]);
        let names: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
        let python_pos = names.iter().position(|&n| n == "Python").expect("Python selected");
        let django_pos = names.iter().position(|&n| n == "Django").expect("Django selected");
        if let Some(react_pos) = names.iter().position(|&n| n == "React") {
            assert!(python_pos < react_pos);
            assert!(django_pos < react_pos);
        }
    }

    #[test]
    fn test_skills_fall_back_to_first_ten_when_nothing_scores() {
        let t = target(&["cobol"], &[]);
        let skills: Vec<Skill> = (0..14).map(|i| skill(&format!("skill-{i}"))).collect();
        let selected = select_skills(&skills, &t, &[]);
        assert_eq!(selected.len(), 10);
        assert_eq!(selected[0].name, "skill-0");
    }

    #[test]
    fn test_skills_capped_at_eighteen() {
        let t = target(&["python"], &[]);
        // Every skill gets the experience-text signal, so all score > 0
        let exp = make_experience(
            &(0..30).map(|i| format!("skill-{i}")).collect::<Vec<_>>().join(" "),
            &[],
        );
        let skills: Vec<Skill> = (0..30).map(|i| skill(&format!("skill-{i}"))).collect();
        let selected = select_skills(&skills, &t, &[exp]);
        assert_eq!(selected.len(), MAX_SELECTED_SKILLS);
    }

    #[test]
    fn test_empty_skill_list_stays_empty() {
        let selected = select_skills(&[], &target(&["python"], &[]), &[]);
        assert!(selected.is_empty());
    }
}
