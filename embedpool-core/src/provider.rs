//! The embedding provider capability trait.
//!
//! This is the seam between the group router and the remote services it
//! pools. A provider is anything that can turn text into a fixed-size
//! vector; the router never sees HTTP, authentication, or wire formats.

use async_trait::async_trait;

use crate::Result;
use crate::similarity::TEST_SENTENCE;

/// Probe text used by the default liveness check.
const AVAILABILITY_PROBE: &str = "ping";

/// A remote embedding source.
///
/// Implementations wrap one concrete service (an OpenAI-compatible API, an
/// Ollama daemon, ...). The group router owns providers only as
/// `Arc<dyn EmbeddingProvider>` and selects among equivalent ones at
/// dispatch time.
///
/// # Examples
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use embedpool_core::{EmbeddingProvider, Result};
///
/// #[derive(Debug)]
/// struct ConstantProvider {
///     dimension: usize,
/// }
///
/// #[async_trait]
/// impl EmbeddingProvider for ConstantProvider {
///     async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
///         Ok(vec![0.1; self.dimension])
///     }
///
///     async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
///         Ok(texts.iter().map(|_| vec![0.1; self.dimension]).collect())
///     }
///
///     fn provider_name(&self) -> &str {
///         "constant"
///     }
///
///     fn model_name(&self) -> &str {
///         "constant-v1"
///     }
/// }
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Generate an embedding for a single text.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the remote call fails.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts in one remote call.
    ///
    /// The result preserves input order: `result[i]` is the embedding of
    /// `texts[i]`.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the remote call fails.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Stable identity of this provider, used for logging and selection.
    fn provider_name(&self) -> &str;

    /// The model label this provider declares.
    fn model_name(&self) -> &str;

    /// Embedding of the canonical test sentence.
    ///
    /// Used only for group admission. Implementations that bill per request
    /// should cache the result.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the remote call fails.
    async fn test_embedding(&self) -> Result<Vec<f32>> {
        self.embed(TEST_SENTENCE).await
    }

    /// Dimensionality of the vectors this provider produces.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the dimension cannot be determined.
    async fn dimension(&self) -> Result<usize> {
        Ok(self.test_embedding().await?.len())
    }

    /// Liveness check. Must perform a real round trip, not report a cached
    /// flag.
    async fn is_available(&self) -> bool {
        self.embed(AVAILABILITY_PROBE).await.is_ok()
    }
}
