//! Ollama embeddings adapter.
//!
//! Uses the daemon's `/api/embeddings` endpoint, which embeds one prompt
//! per request; batches are issued as sequential calls.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;

use embedpool_core::{EmbedPoolError, EmbeddingProvider, Result, TEST_SENTENCE};

use crate::config::ProviderConfig;
use crate::http::{build_client, check_status, map_request_error};

/// Adapter for a local or remote Ollama daemon.
#[derive(Debug)]
pub struct OllamaProvider {
    api_url: String,
    model: String,
    timeout: std::time::Duration,
    client: reqwest::Client,
    fingerprint: OnceCell<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    embedding: Vec<f32>,
}

/// Extract the embedding vector from an `/api/embeddings` response body.
pub(crate) fn parse_embedding(body: &str) -> Result<Vec<f32>> {
    let response: OllamaResponse = serde_json::from_str(body)
        .map_err(|e| EmbedPoolError::provider(format!("malformed embeddings response: {e}")))?;
    Ok(response.embedding)
}

impl OllamaProvider {
    /// Build an adapter from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint is missing or the HTTP client cannot be
    /// constructed.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .ok_or_else(|| EmbedPoolError::configuration("ollama provider requires api_url"))?;
        Ok(Self {
            api_url,
            model: config.model,
            timeout: config.timeout,
            client: build_client(config.timeout)?,
            fingerprint: OnceCell::new(),
        })
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!(model = %self.model, "requesting embedding");
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.api_url))
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|e| map_request_error(&e, self.timeout))?;
        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| map_request_error(&e, self.timeout))?;
        parse_embedding(&body)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request_embedding(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.request_embedding(text).await?);
        }
        Ok(embeddings)
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn test_embedding(&self) -> Result<Vec<f32>> {
        self.fingerprint
            .get_or_try_init(|| self.request_embedding(TEST_SENTENCE))
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedding() {
        let body = r#"{"embedding": [0.25, -0.5, 1.0]}"#;
        assert_eq!(parse_embedding(body).unwrap(), vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn test_parse_embedding_malformed() {
        assert!(parse_embedding(r#"{"error": "model not found"}"#).is_err());
    }

    #[test]
    fn test_new_requires_url() {
        let config = ProviderConfig {
            api_url: None,
            model: "nomic-embed-text".to_string(),
            api_key: None,
            timeout: std::time::Duration::from_secs(30),
        };
        assert!(matches!(
            OllamaProvider::new(config),
            Err(EmbedPoolError::Configuration { .. })
        ));
    }
}
