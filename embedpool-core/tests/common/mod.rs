//! Shared stub provider for group routing tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use embedpool_core::{EmbedPoolError, EmbeddingProvider, Result};

/// Deterministic per-text embedding so tests can assert output ordering.
pub fn encode(text: &str) -> Vec<f32> {
    let sum: u32 = text.bytes().map(u32::from).sum();
    vec![text.len() as f32, (sum % 97) as f32, 1.0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    /// Answer after the configured latency.
    Succeed,
    /// Return a provider error immediately.
    Fail,
    /// Never answer; forces the dispatch timeout.
    Hang,
}

#[derive(Debug)]
pub struct StubProvider {
    name: String,
    model: String,
    test_vector: Vec<f32>,
    behavior: StubBehavior,
    latency: Duration,
    embedded: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn new(name: &str, test_vector: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            model: "stub-model".to_string(),
            test_vector,
            behavior: StubBehavior::Succeed,
            latency: Duration::ZERO,
            embedded: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_behavior(mut self, behavior: StubBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Handle onto the count of texts this stub has embedded.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.embedded)
    }
}

#[async_trait]
impl EmbeddingProvider for StubProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut embeddings = self.embed_batch(&texts).await?;
        Ok(embeddings.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self.behavior {
            StubBehavior::Succeed => {
                tokio::time::sleep(self.latency).await;
                self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
                Ok(texts.iter().map(|text| encode(text)).collect())
            }
            StubBehavior::Fail => Err(EmbedPoolError::provider("stub backend refused the call")),
            StubBehavior::Hang => futures::future::pending().await,
        }
    }

    fn provider_name(&self) -> &str {
        &self.name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn test_embedding(&self) -> Result<Vec<f32>> {
        Ok(self.test_vector.clone())
    }
}
