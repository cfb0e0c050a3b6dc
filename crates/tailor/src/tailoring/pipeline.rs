//! Pipeline orchestration — the public entry point of the crate.
//!
//! Flow: extract_requirements → skill mapping → select_content →
//!       adapt_content → assemble.
//!
//! Each invocation runs to completion for one profile/JD pair with no shared
//! mutable state; capability calls are the only suspension points and are
//! issued sequentially per text unit. The only hard failures are structurally
//! unusable input — everything downstream degrades and surfaces as warnings.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::llm_client::TextRewriter;
use crate::models::profile::Profile;
use crate::tailoring::adapter::adapt_content;
use crate::tailoring::assembler::{assemble, CoverageSummary, DraftCv};
use crate::tailoring::requirements::extract_requirements;
use crate::tailoring::selector::{
    select_content, select_skills, TargetSpec, DEFAULT_MAX_EXPERIENCES,
};
use crate::tailoring::skills::{evaluate_skills, map_skills, SkillMapping};

/// Result of a pipeline run: the tailored draft, the requirement coverage
/// report, and any warnings accumulated along the way.
#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub cv: DraftCv,
    pub coverage: CoverageSummary,
    pub warnings: Vec<String>,
}

/// Runs the full tailoring pipeline for one profile/JD pair.
///
/// `max_experiences` defaults to 4. `additional_context` is free text from the
/// caller folded into the adaptation prompts. The capability is injected —
/// pass an unconfigured rewriter to run fully on heuristics.
pub async fn generate(
    profile: &Profile,
    job_description: &str,
    rewriter: &dyn TextRewriter,
    max_experiences: Option<usize>,
    additional_context: Option<&str>,
) -> Result<Draft, PipelineError> {
    if job_description.trim().is_empty() {
        return Err(PipelineError::Validation(
            "job description must not be empty".to_string(),
        ));
    }

    let mut warnings: Vec<String> = Vec::new();

    // Stage 1: requirement extraction (never fails)
    let requirements = extract_requirements(job_description, rewriter).await;
    info!(
        "extracted {} required / {} preferred terms, {} responsibilities",
        requirements.required_skills.len(),
        requirements.preferred_skills.len(),
        requirements.responsibilities.len()
    );

    // Stage 2: skill matching — evaluator when the capability is configured,
    // legacy heuristic mapper otherwise or when the evaluator fails.
    let mapping = resolve_skill_mapping(profile, &requirements, rewriter, &mut warnings).await;
    info!(
        "matched {} skills, {} coverage gaps",
        mapping.selected_skills.len(),
        mapping.coverage_gaps.len()
    );

    // Stage 3: content selection
    let target = TargetSpec::from_requirements(&requirements);
    let selection = select_content(
        &profile.experiences,
        &target,
        max_experiences.unwrap_or(DEFAULT_MAX_EXPERIENCES),
    );
    warnings.extend(selection.warnings.iter().cloned());
    info!("selected {} experiences", selection.experiences.len());

    // Stage 4: adaptation (per-unit failures keep original text)
    let adapted = adapt_content(&selection, &requirements, rewriter, additional_context).await;
    info!("adapted {} text units", adapted.adaptation_notes.len());

    // Stage 5: assembly
    let skills = select_skills(&profile.skills, &target, &selection.experiences);
    let (cv, coverage) = assemble(
        &profile.personal,
        &adapted,
        skills,
        &profile.education,
        &mapping,
    );

    Ok(Draft {
        cv,
        coverage,
        warnings,
    })
}

/// Picks the skill-matching backend. The evaluator's hard capability
/// precondition stays intact for direct callers; at the pipeline level an
/// evaluator failure degrades to the heuristic mapper with a warning.
async fn resolve_skill_mapping(
    profile: &Profile,
    requirements: &crate::tailoring::requirements::RequirementSet,
    rewriter: &dyn TextRewriter,
    warnings: &mut Vec<String>,
) -> SkillMapping {
    if !rewriter.is_configured() {
        return map_skills(&profile.skills, requirements);
    }

    match evaluate_skills(&profile.skills, requirements, rewriter).await {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!("skill evaluator failed ({e}); using heuristic mapper");
            warnings.push("skill evaluation degraded to heuristic matching".to_string());
            map_skills(&profile.skills, requirements)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{FailingRewriter, UnconfiguredRewriter};
    use crate::models::profile::{Education, Experience, PersonalInfo, Project, Skill};
    use chrono::NaiveDate;
    use uuid::Uuid;

    const JD: &str = "\
Senior Backend Engineer
Required: Python, Django, PostgreSQL.
You will build and maintain payment services.
Nice to have: Kubernetes.";

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            category: "technical".to_string(),
        }
    }

    fn make_profile() -> Profile {
        Profile {
            personal: PersonalInfo {
                name: "Ada Lovelace".to_string(),
                title: "Software Engineer".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                location: Some("London".to_string()),
                summary: None,
            },
            experiences: vec![
                Experience {
                    id: Uuid::new_v4(),
                    company: "Acme".to_string(),
                    position: "Backend Engineer".to_string(),
                    description: "Built Python payment services with Django".to_string(),
                    technologies: vec!["Python".to_string(), "Django".to_string()],
                    projects: vec![Project {
                        name: "Billing".to_string(),
                        description: "Invoicing platform on PostgreSQL".to_string(),
                        highlights: vec![
                            "Cut invoice latency by 40%".to_string(),
                            "Migrated 2M rows to PostgreSQL".to_string(),
                        ],
                        technologies: vec!["PostgreSQL".to_string()],
                    }],
                    start_date: NaiveDate::from_ymd_opt(2021, 3, 1),
                    end_date: None,
                },
                Experience {
                    id: Uuid::new_v4(),
                    company: "Globex".to_string(),
                    position: "Frontend Engineer".to_string(),
                    description: "Built marketing pages".to_string(),
                    technologies: vec!["React".to_string()],
                    projects: vec![],
                    start_date: NaiveDate::from_ymd_opt(2018, 1, 1),
                    end_date: NaiveDate::from_ymd_opt(2021, 2, 1),
                },
            ],
            education: vec![Education {
                id: Uuid::new_v4(),
                institution: "University of London".to_string(),
                degree: "BSc".to_string(),
                field: "Mathematics".to_string(),
                start_date: None,
                end_date: None,
            }],
            skills: vec![skill("Python"), skill("Django"), skill("React")],
        }
    }

    #[tokio::test]
    async fn test_empty_jd_is_a_validation_error() {
        let result = generate(&make_profile(), "  \n ", &UnconfiguredRewriter, None, None).await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_full_pipeline_without_capability() {
        let draft = generate(&make_profile(), JD, &UnconfiguredRewriter, None, None)
            .await
            .expect("heuristic pipeline must succeed");

        // Relevant experience first, education untouched
        assert_eq!(draft.cv.experiences[0].company, "Acme");
        assert_eq!(draft.cv.education[0].institution, "University of London");

        // Python and Django selected and ranked above React
        let names: Vec<&str> = draft.cv.skills.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"Python"));
        assert!(names.contains(&"Django"));

        // JD requires kubernetes only as preferred; no profile skill covers it
        assert!(draft.coverage.gaps.contains(&"kubernetes".to_string()));
        assert!(draft
            .coverage
            .covered_requirements
            .contains(&"python".to_string()));
    }

    #[tokio::test]
    async fn test_full_pipeline_with_always_failing_capability() {
        // Configured but every call raises: extraction falls back, the skill
        // evaluator degrades with a warning, adaptation keeps originals.
        let draft = generate(&make_profile(), JD, &FailingRewriter, None, None)
            .await
            .expect("pipeline must degrade, not fail");

        assert!(!draft.cv.experiences.is_empty());
        assert_eq!(
            draft.cv.experiences[0].description,
            "Built Python payment services with Django"
        );
        assert!(draft
            .warnings
            .iter()
            .any(|w| w.contains("heuristic matching")));
    }

    #[tokio::test]
    async fn test_fact_preservation_without_capability() {
        // No adaptation happened, so every highlight in the draft must be a
        // verbatim copy of a profile highlight.
        let profile = make_profile();
        let draft = generate(&profile, JD, &UnconfiguredRewriter, None, None)
            .await
            .unwrap();

        let original_highlights: Vec<&String> = profile
            .experiences
            .iter()
            .flat_map(|e| e.projects.iter())
            .flat_map(|p| p.highlights.iter())
            .collect();
        let original_technologies: Vec<&String> = profile
            .experiences
            .iter()
            .flat_map(|e| {
                e.technologies
                    .iter()
                    .chain(e.projects.iter().flat_map(|p| p.technologies.iter()))
            })
            .collect();
        for exp in &draft.cv.experiences {
            for tech in &exp.technologies {
                assert!(
                    original_technologies.contains(&tech),
                    "technology '{tech}' is not from the profile"
                );
            }
            for project in &exp.projects {
                for highlight in &project.highlights {
                    assert!(
                        original_highlights.contains(&highlight),
                        "highlight '{highlight}' is not from the profile"
                    );
                }
                for tech in &project.technologies {
                    assert!(
                        original_technologies.contains(&tech),
                        "technology '{tech}' is not from the profile"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_zero_experience_profile_yields_warning() {
        let mut profile = make_profile();
        profile.experiences.clear();
        let draft = generate(&profile, JD, &UnconfiguredRewriter, None, None)
            .await
            .expect("empty experience list is not an error");
        assert!(draft.cv.experiences.is_empty());
        assert!(!draft.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_max_experiences_is_honored() {
        let draft = generate(&make_profile(), JD, &UnconfiguredRewriter, Some(1), None)
            .await
            .unwrap();
        assert_eq!(draft.cv.experiences.len(), 1);
        assert_eq!(draft.cv.experiences[0].company, "Acme");
    }
}
