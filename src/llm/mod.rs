/// OpenAI chat-completions provider.
pub mod openai;
/// Deterministic fallback content used when no provider is reachable.
pub mod templates;

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur during LLM operations. Callers always absorb these
/// into the deterministic fallback path; they never reach an end user.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider API rejected or failed the request.
    #[error("API request failed: {0}")]
    Api(String),
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The provider response could not be interpreted.
    #[error("response parsing failed: {0}")]
    Parse(String),
}

/// A single text-generation request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt establishing the persona.
    pub system: String,
    /// User prompt carrying the game context.
    pub prompt: String,
    /// Upper bound on the generated length in tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Hard deadline for the round trip.
    pub timeout: Duration,
}

/// Trait implemented by text-generation providers.
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the given request.
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'static, LlmResult<String>>;

    /// Name of this provider, for logging.
    fn name(&self) -> &'static str;
}

/// Provider configuration read from the environment.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; generation falls back to templates when absent.
    pub api_key: Option<String>,
    /// Chat model to request.
    pub model: String,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    /// Load configuration from `OPENAI_API_KEY`, `OPENAI_MODEL`, and
    /// `LLM_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().and_then(|key| {
            let trimmed = key.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let model = std::env::var("OPENAI_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "gpt-3.5-turbo".to_string());

        let timeout = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Self {
            api_key,
            model,
            timeout,
        }
    }

    /// Build the provider when an API key is configured.
    pub fn build_provider(&self) -> Option<Arc<dyn LlmProvider>> {
        let api_key = self.api_key.clone()?;
        let provider: Arc<dyn LlmProvider> =
            Arc::new(OpenAiProvider::new(api_key, self.model.clone()));
        Some(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_key_and_sane_timeout() {
        let config = LlmConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.build_provider().is_none());
    }
}
