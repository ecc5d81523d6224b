//! Gemini embeddings adapter.
//!
//! Uses the Generative Language API: `:embedContent` for single texts and
//! `:batchEmbedContents` for batches, authenticated by a key query
//! parameter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;

use embedpool_core::{EmbedPoolError, EmbeddingProvider, Result, TEST_SENTENCE};

use crate::config::ProviderConfig;
use crate::http::{build_client, check_status, map_request_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Adapter for the Gemini embedding API.
#[derive(Debug)]
pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: String,
    timeout: std::time::Duration,
    client: reqwest::Client,
    fingerprint: OnceCell<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    embeddings: Vec<ContentEmbedding>,
}

/// Extract the vector from an `:embedContent` response body.
pub(crate) fn parse_embedding(body: &str) -> Result<Vec<f32>> {
    let response: EmbedContentResponse = serde_json::from_str(body)
        .map_err(|e| EmbedPoolError::provider(format!("malformed embedContent response: {e}")))?;
    Ok(response.embedding.values)
}

/// Extract vectors from a `:batchEmbedContents` response body.
pub(crate) fn parse_batch(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let response: BatchEmbedContentsResponse = serde_json::from_str(body).map_err(|e| {
        EmbedPoolError::provider(format!("malformed batchEmbedContents response: {e}"))
    })?;
    if response.embeddings.len() != expected {
        return Err(EmbedPoolError::provider(format!(
            "expected {expected} embeddings, response carries {}",
            response.embeddings.len()
        )));
    }
    Ok(response
        .embeddings
        .into_iter()
        .map(|embedding| embedding.values)
        .collect())
}

impl GeminiProvider {
    /// Build an adapter from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when the API key is missing or the HTTP client cannot be
    /// constructed.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| EmbedPoolError::configuration("gemini provider requires api_key"))?;
        Ok(Self {
            base_url: config
                .api_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model,
            api_key,
            timeout: config.timeout,
            client: build_client(config.timeout)?,
            fingerprint: OnceCell::new(),
        })
    }

    async fn request(&self, action: &str, payload: serde_json::Value) -> Result<String> {
        debug!(model = %self.model, action, "requesting embeddings");
        let url = format!(
            "{}/models/{}:{action}",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_request_error(&e, self.timeout))?;
        check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| map_request_error(&e, self.timeout))
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let payload = json!({ "content": { "parts": [{ "text": text }] } });
        let body = self.request("embedContent", payload).await?;
        parse_embedding(&body)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request_embedding(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let requests: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": format!("models/{}", self.model),
                    "content": { "parts": [{ "text": text }] }
                })
            })
            .collect();
        let body = self
            .request("batchEmbedContents", json!({ "requests": requests }))
            .await?;
        parse_batch(&body, texts.len())
    }

    fn provider_name(&self) -> &str {
        "gemini"
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
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_embedding() {
        let body = r#"{"embedding": {"values": [0.1, 0.2, 0.3]}}"#;
        assert_eq!(parse_embedding(body).unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_parse_batch_preserves_order() {
        let body = r#"{"embeddings": [{"values": [0.1]}, {"values": [0.2]}]}"#;
        assert_eq!(parse_batch(body, 2).unwrap(), vec![vec![0.1], vec![0.2]]);
    }

    #[test]
    fn test_parse_batch_count_mismatch() {
        let body = r#"{"embeddings": [{"values": [0.1]}]}"#;
        assert!(parse_batch(body, 3).is_err());
    }

    #[test]
    fn test_new_requires_key() {
        let config = ProviderConfig {
            api_url: None,
            model: "text-embedding-004".to_string(),
            api_key: None,
            timeout: std::time::Duration::from_secs(30),
        };
        assert!(matches!(
            GeminiProvider::new(config),
            Err(EmbedPoolError::Configuration { .. })
        ));
    }
}
