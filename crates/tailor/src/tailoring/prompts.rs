// Per-stage prompt templates. Treated as opaque, versioned text owned by each
// stage; the builders that fill them live beside the stage code and are unit
// tested without any network call.

/// Role line for requirement extraction. Composed with the JSON-only fragment
/// via `llm_client::prompts::json_system_prompt` at the call site.
pub const EXTRACTION_SYSTEM: &str =
    "You are an expert job-description analyst. Extract structured hiring \
    requirements from a job description.";

/// Requirement extraction template. Replace `{jd_text}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract structured requirements from the job description below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "required_skills": ["python", "django"],
  "preferred_skills": ["kubernetes"],
  "responsibilities": ["Design and build backend services"],
  "domain_keywords": ["fintech", "payments"],
  "seniority_signals": ["senior"]
}

Rules:
- required_skills: technologies the role explicitly demands
- preferred_skills: nice-to-have / bonus technologies
- responsibilities: at most 10 short responsibility statements
- domain_keywords: domain and business vocabulary, not technologies already listed
- seniority_signals: at most 5 seniority words found in the text

JOB DESCRIPTION:
{jd_text}"#;

/// Role line for capability-gated skill matching. Composed with the JSON-only
/// fragment at the call site. The array shape is pinned by the user template.
pub const SKILL_MATCH_SYSTEM: &str =
    "You are an expert technical recruiter matching candidate skills against \
    job requirements. \
    Do NOT invent skills the candidate does not have.";

/// Skill-match template. Replace `{skills_json}`, `{required_json}`,
/// `{preferred_json}` before sending.
pub const SKILL_MATCH_PROMPT_TEMPLATE: &str = r#"For each candidate skill, decide whether it matches any job requirement.

CANDIDATE SKILLS:
{skills_json}

REQUIRED:
{required_json}

PREFERRED:
{preferred_json}

Return a JSON ARRAY, one object per matching skill (omit skills with no match):
[
  {
    "skill": "the exact candidate skill name from the list above",
    "requirement": "the requirement term it matches",
    "match_type": "exact",
    "confidence": 0.9,
    "explanation": "one short sentence"
  }
]

match_type must be one of: "exact", "synonym", "ecosystem", "related", "covers".
confidence must be between 0.0 and 1.0.
The "skill" field must be copied verbatim from the candidate skill list."#;

/// Rewording template for the content adapter. Replace `{original_text}`,
/// `{terminology}`, `{budget}`, `{additional_context}` before sending.
/// The fact-preservation instruction is prepended by the builder.
pub const ADAPT_PROMPT_TEMPLATE: &str = r#"Rephrase the text below so it speaks the language of the target role.

ORIGINAL TEXT (the only source of facts):
{original_text}

ROLE TERMINOLOGY to prefer where the original already supports it:
{terminology}

{additional_context}
Constraints:
- Rephrase only. Keep every fact, metric, and date exactly as stated.
- Stay under {budget} characters.
- Return the rewritten text only, with no quotes or commentary."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_carry_their_placeholders() {
        assert!(EXTRACTION_PROMPT_TEMPLATE.contains("{jd_text}"));
        assert!(SKILL_MATCH_PROMPT_TEMPLATE.contains("{skills_json}"));
        assert!(SKILL_MATCH_PROMPT_TEMPLATE.contains("{required_json}"));
        assert!(SKILL_MATCH_PROMPT_TEMPLATE.contains("{preferred_json}"));
        assert!(ADAPT_PROMPT_TEMPLATE.contains("{original_text}"));
        assert!(ADAPT_PROMPT_TEMPLATE.contains("{budget}"));
    }
}
