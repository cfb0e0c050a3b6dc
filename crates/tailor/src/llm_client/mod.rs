//! Text-generation capability — the single point of entry for all external
//! text-rewrite calls in the pipeline.
//!
//! ARCHITECTURAL RULE: no other module may talk to the chat-completion
//! endpoint directly. Stages receive the capability as `&dyn TextRewriter`
//! (explicit injection, never a process-wide singleton) and must check
//! `is_configured()` before treating it as available.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;

pub mod prompts;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("capability not configured")]
    Unconfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("transient failures exhausted {retries} retries")]
    RetriesExhausted { retries: u32 },

    #[error("capability returned empty content")]
    EmptyContent,
}

/// The stateless, retryable text-rewrite capability used by the extraction,
/// matching and adaptation stages. Given free text and an instruction, return
/// a rewritten string.
///
/// Stages that treat the capability as optional must check `is_configured()`
/// first and fall back to heuristics when it returns false or when `rewrite`
/// fails.
#[async_trait]
pub trait TextRewriter: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn rewrite(&self, text: &str, instruction: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types — chat-completion contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
    /// Omitted entirely for reasoning models — they reject the field.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// HTTP client for a chat-completion-style endpoint with bearer-token auth.
/// Retries transient failures (429/500/502/503 and request timeouts) up to
/// 3 times with exponential backoff; other 4xx errors fail fast.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(LlmConfig::from_env()?))
    }

    async fn call(&self, text: &str, instruction: &str) -> Result<String, LlmError> {
        if !self.config.is_configured() {
            return Err(LlmError::Unconfigured);
        }

        let temperature = if is_reasoning_model(&self.config.model) {
            None
        } else {
            Some(self.config.temperature)
        };

        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_completion_tokens: self.config.max_completion_tokens,
            temperature,
        };

        let mut last_error: Option<LlmError> = None;

        // One initial attempt plus up to MAX_RETRIES retries
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "rewrite attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.config.endpoint)
                .bearer_auth(&self.config.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    // Timeouts and connection errors are transient
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if matches!(status, 429 | 500 | 502 | 503) {
                let body = response.text().await.unwrap_or_default();
                warn!("endpoint returned {status}: {body}");
                last_error = Some(LlmError::Api {
                    status,
                    message: body,
                });
                continue;
            }

            if !(200..300).contains(&status) {
                let message = response.text().await.unwrap_or_default();
                return Err(LlmError::Api { status, message });
            }

            let parsed: ChatResponse = response.json().await?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.trim().is_empty())
                .ok_or(LlmError::EmptyContent)?;

            debug!("rewrite succeeded ({} chars)", content.len());
            return Ok(content);
        }

        Err(last_error.unwrap_or(LlmError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextRewriter for LlmClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn rewrite(&self, text: &str, instruction: &str) -> Result<String, LlmError> {
        self.call(text, instruction).await
    }
}

/// Reasoning models reject the `temperature` parameter; detect them by
/// model-name pattern so the field can be omitted from the request body.
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.to_lowercase();
    ["o1", "o3", "o4", "gpt-5"]
        .iter()
        .any(|prefix| model.starts_with(prefix))
        || model.contains("reasoning")
}

/// Parses capability output as JSON, tolerating markdown code fences.
pub fn parse_fenced_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from capability output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test fakes
// ────────────────────────────────────────────────────────────────────────────

/// Fake rewriters shared by the stage tests. No network, no global state.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Returns canned responses in order; errors once the script runs out.
    pub struct ScriptedRewriter {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedRewriter {
        pub fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            }
        }
    }

    #[async_trait]
    impl TextRewriter for ScriptedRewriter {
        fn is_configured(&self) -> bool {
            true
        }

        async fn rewrite(&self, _text: &str, _instruction: &str) -> Result<String, LlmError> {
            self.responses
                .lock()
                .expect("script lock poisoned")
                .pop_front()
                .ok_or(LlmError::EmptyContent)
        }
    }

    /// Configured but every call fails — exercises fallback paths.
    pub struct FailingRewriter;

    #[async_trait]
    impl TextRewriter for FailingRewriter {
        fn is_configured(&self) -> bool {
            true
        }

        async fn rewrite(&self, _text: &str, _instruction: &str) -> Result<String, LlmError> {
            Err(LlmError::RetriesExhausted { retries: 3 })
        }
    }

    /// Capability absent — `is_configured()` is false.
    pub struct UnconfiguredRewriter;

    #[async_trait]
    impl TextRewriter for UnconfiguredRewriter {
        fn is_configured(&self) -> bool {
            false
        }

        async fn rewrite(&self, _text: &str, _instruction: &str) -> Result<String, LlmError> {
            Err(LlmError::Unconfigured)
        }
    }
}
