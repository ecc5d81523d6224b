//! Configuration for HTTP provider adapters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Connection settings for one remote embedding service.
///
/// Which fields are required depends on the provider kind; the factory
/// validates per kind before constructing an adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Service endpoint. Required for OpenAI-compatible and Ollama
    /// adapters; overrides the default Gemini base URL when set.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Model identifier sent with every request.
    pub model: String,

    /// API key. Required for OpenAI-compatible and Gemini adapters.
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP client timeout for one request.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Settings for an OpenAI-compatible embeddings endpoint.
    pub fn openai(
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: Some(api_url.into()),
            model: model.into(),
            api_key: Some(api_key.into()),
            timeout: default_timeout(),
        }
    }

    /// Settings for a local or remote Ollama daemon.
    pub fn ollama(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: Some(api_url.into()),
            model: model.into(),
            api_key: None,
            timeout: default_timeout(),
        }
    }

    /// Settings for the Gemini embedding API.
    pub fn gemini(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: None,
            model: model.into(),
            api_key: Some(api_key.into()),
            timeout: default_timeout(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
