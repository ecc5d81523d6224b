//! Construction of provider adapters by kind name.
//!
//! The outer configuration layer addresses providers by a string kind
//! ("openai", "ollama", "gemini"); this factory maps the kind to the
//! matching adapter and validates the kind-specific required fields.

use std::sync::Arc;

use tracing::info;

use embedpool_core::{EmbedPoolError, EmbeddingProvider, Result};

use crate::config::ProviderConfig;
use crate::gemini::GeminiProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;

/// Provider kinds this crate can construct.
pub const SUPPORTED_KINDS: &[&str] = &["openai", "ollama", "gemini"];

/// Build the adapter for `kind` from its configuration.
///
/// # Errors
///
/// Returns a configuration error for an unsupported kind or a
/// configuration missing a field the kind requires.
pub fn build_provider(kind: &str, config: ProviderConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match kind {
        "openai" => Arc::new(OpenAiProvider::new(config)?),
        "ollama" => Arc::new(OllamaProvider::new(config)?),
        "gemini" => Arc::new(GeminiProvider::new(config)?),
        other => {
            return Err(EmbedPoolError::configuration(format!(
                "unsupported embedding provider kind: {other}"
            )));
        }
    };
    info!(
        kind,
        model = provider.model_name(),
        "constructed embedding provider"
    );
    Ok(provider)
}
