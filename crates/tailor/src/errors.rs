use thiserror::Error;

use crate::llm_client::LlmError;

/// Pipeline-level error type.
///
/// Most failure modes inside the pipeline degrade instead of erroring: a
/// failed requirement extraction falls back to heuristics, a failed rewrite
/// keeps the original text. The variants here cover what is left — inputs the
/// pipeline cannot work with, and entry points that mandate the
/// text-generation capability.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Text-generation capability required but not configured: {0}")]
    Configuration(String),

    #[error("Text-generation error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
