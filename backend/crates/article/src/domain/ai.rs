//! Content Generation Port
//!
//! Optional collaborator used for slug suggestions and block generation.
//! Nothing depends on it for correctness: callers fall back or report
//! `AiUnavailable`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("content generation is not configured")]
    Disabled,

    #[error("content generation timed out")]
    Timeout,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("empty response")]
    EmptyResponse,
}

/// Text-completion client
#[trait_variant::make(AiClient: Send)]
pub trait LocalAiClient {
    /// Send one prompt, return the model's text answer.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// Client used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAiClient;

impl AiClient for DisabledAiClient {
    async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::Disabled)
    }
}
