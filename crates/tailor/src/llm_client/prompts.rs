// Cross-cutting prompt fragments shared by the stages.
// Each stage defines its own templates in tailoring::prompts; this file holds
// the fragments every capability call reuses.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT include explanations or apologies.";

/// Composes a stage role description with the JSON-only fragment into a full
/// system prompt.
pub fn json_system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

/// Instruction appended to every rewording request. Fact preservation is the
/// pipeline's core invariant: rephrase, never invent.
pub const FACT_PRESERVATION_INSTRUCTION: &str = "\
    CRITICAL: Rephrase only. Do NOT add any fact, metric, technology, date, \
    company name, or achievement that is not present in the original text. \
    If the original does not support a claim, omit it entirely.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_preservation_forbids_invention() {
        assert!(FACT_PRESERVATION_INSTRUCTION.contains("Do NOT add"));
        assert!(JSON_ONLY_SYSTEM.contains("valid JSON only"));
    }

    #[test]
    fn test_json_system_prompt_appends_fragment() {
        let prompt = json_system_prompt("You are an analyst.");
        assert!(prompt.starts_with("You are an analyst."));
        assert!(prompt.ends_with(JSON_ONLY_SYSTEM));
    }
}
