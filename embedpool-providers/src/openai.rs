//! OpenAI-compatible embeddings adapter.
//!
//! Talks to any endpoint implementing the OpenAI `/embeddings` contract:
//! bearer authentication, a JSON body with `model` and `input`, and a
//! `data` array of indexed embeddings in the response.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;

use embedpool_core::{EmbedPoolError, EmbeddingProvider, Result, TEST_SENTENCE};

use crate::config::ProviderConfig;
use crate::http::{build_client, check_status, map_request_error};

/// Adapter for OpenAI-compatible embedding endpoints.
#[derive(Debug)]
pub struct OpenAiProvider {
    api_url: String,
    model: String,
    api_key: String,
    timeout: std::time::Duration,
    client: reqwest::Client,
    fingerprint: OnceCell<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Extract embeddings from a response body, restoring input order from the
/// per-item index.
pub(crate) fn parse_embeddings(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let response: EmbeddingsResponse = serde_json::from_str(body)
        .map_err(|e| EmbedPoolError::provider(format!("malformed embeddings response: {e}")))?;
    if response.data.len() != expected {
        return Err(EmbedPoolError::provider(format!(
            "expected {expected} embeddings, response carries {}",
            response.data.len()
        )));
    }
    let mut items = response.data;
    items.sort_by_key(|item| item.index);
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

impl OpenAiProvider {
    /// Build an adapter from a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when a required field is missing or the HTTP client cannot be
    /// constructed.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .ok_or_else(|| EmbedPoolError::configuration("openai provider requires api_url"))?;
        let api_key = config
            .api_key
            .ok_or_else(|| EmbedPoolError::configuration("openai provider requires api_key"))?;
        Ok(Self {
            api_url,
            model: config.model,
            api_key,
            timeout: config.timeout,
            client: build_client(config.timeout)?,
            fingerprint: OnceCell::new(),
        })
    }

    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // The OpenAI API treats newlines as significant; flatten them.
        let input: Vec<String> = texts.iter().map(|t| t.replace('\n', " ")).collect();
        debug!(model = %self.model, items = input.len(), "requesting embeddings");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": input }))
            .send()
            .await
            .map_err(|e| map_request_error(&e, self.timeout))?;
        let body = check_status(response)
            .await?
            .text()
            .await
            .map_err(|e| map_request_error(&e, self.timeout))?;
        parse_embeddings(&body, texts.len())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut embeddings = self.request_embeddings(&texts).await?;
        Ok(embeddings.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.request_embeddings(texts).await
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn test_embedding(&self) -> Result<Vec<f32>> {
        self.fingerprint
            .get_or_try_init(|| async {
                let texts = [TEST_SENTENCE.to_string()];
                let mut embeddings = self.request_embeddings(&texts).await?;
                Ok(embeddings.remove(0))
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_embeddings_restores_index_order() {
        let body = r#"{
            "data": [
                {"index": 1, "embedding": [0.4, 0.5]},
                {"index": 0, "embedding": [0.1, 0.2]}
            ]
        }"#;
        let embeddings = parse_embeddings(body, 2).unwrap();
        assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.4, 0.5]]);
    }

    #[test]
    fn test_parse_embeddings_count_mismatch() {
        let body = r#"{"data": [{"index": 0, "embedding": [0.1]}]}"#;
        assert!(parse_embeddings(body, 2).is_err());
    }

    #[test]
    fn test_parse_embeddings_malformed_body() {
        assert!(parse_embeddings("not json", 1).is_err());
        assert!(parse_embeddings(r#"{"error": "nope"}"#, 1).is_err());
    }

    #[test]
    fn test_new_requires_url_and_key() {
        let missing_key = ProviderConfig {
            api_url: Some("https://api.openai.com/v1/embeddings".to_string()),
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            timeout: std::time::Duration::from_secs(30),
        };
        assert!(matches!(
            OpenAiProvider::new(missing_key),
            Err(EmbedPoolError::Configuration { .. })
        ));

        let missing_url = ProviderConfig {
            api_url: None,
            model: "text-embedding-3-small".to_string(),
            api_key: Some("sk-test".to_string()),
            timeout: std::time::Duration::from_secs(30),
        };
        assert!(matches!(
            OpenAiProvider::new(missing_url),
            Err(EmbedPoolError::Configuration { .. })
        ));
    }
}
