use anyhow::{Context, Result};

/// Configuration for the text-generation capability, loaded from environment
/// variables. Every field has a default so an unconfigured environment still
/// constructs — the pipeline treats a missing API key as "capability absent"
/// and runs on heuristics.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Bearer token. Empty string means the capability is not configured.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Per-request timeout in seconds. Retries (up to 3) sit above this.
    pub timeout_secs: u64,
    pub max_completion_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            max_completion_tokens: 1024,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Self::default();
        Ok(Self {
            endpoint: optional_env("TAILOR_LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key: optional_env("TAILOR_LLM_API_KEY").unwrap_or_default(),
            model: optional_env("TAILOR_LLM_MODEL").unwrap_or(defaults.model),
            temperature: parse_env("TAILOR_LLM_TEMPERATURE", defaults.temperature)?,
            timeout_secs: parse_env("TAILOR_LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_completion_tokens: parse_env(
                "TAILOR_LLM_MAX_COMPLETION_TOKENS",
                defaults.max_completion_tokens,
            )?,
        })
    }

    /// Whether the capability can be used at all. Callers that treat the
    /// capability as optional must check this before issuing requests.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        None => Ok(default),
    }
}
