//! Group-level request routing over a pool of equivalent providers.
//!
//! A [`ModelGroup`] owns providers verified to share one embedding space,
//! a [`SimilarityCache`] consulted before any remote call, and a
//! [`LatencyScheduler`] that spreads large uncached batches across the
//! pool. Batch calls either fully succeed with results in input order or
//! fully fail; there is no partial-result mode.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::SimilarityCache;
use crate::config::GroupConfig;
use crate::error::{EmbedPoolError, Result};
use crate::provider::EmbeddingProvider;
use crate::scheduler::{BackendState, LatencyScheduler};
use crate::similarity::cosine_similarity;

/// Availability of one pooled provider, as reported by a live probe.
#[derive(Debug, Clone)]
pub struct BackendStatus {
    /// Stable provider identity.
    pub provider: String,
    /// Declared model label.
    pub model: String,
    /// Result of the liveness round trip.
    pub available: bool,
}

/// A named pool of embedding providers whose outputs are verified
/// equivalent, with similarity caching and latency-aware batch dispatch.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use embedpool_core::{GroupConfig, ModelGroup};
/// # use embedpool_core::EmbeddingProvider;
///
/// # async fn example(provider: Arc<dyn EmbeddingProvider>) -> embedpool_core::Result<()> {
/// let group = ModelGroup::new("text-embedding-3-small", vec![provider], GroupConfig::default()).await?;
/// let vector = group.embed("Hello, world!").await?;
/// println!("dimension: {}", vector.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModelGroup {
    name: String,
    config: GroupConfig,
    providers: RwLock<Vec<Arc<dyn EmbeddingProvider>>>,
    default_index: RwLock<usize>,
    fingerprint: Vec<f32>,
    cache: Mutex<SimilarityCache>,
    scheduler: LatencyScheduler,
}

impl ModelGroup {
    /// Create a group from an initial provider list.
    ///
    /// The first provider's test embedding becomes the group fingerprint
    /// against which later admissions are checked. The default provider
    /// starts at index 0.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, an empty provider list, or when
    /// the first provider cannot produce its test embedding.
    pub async fn new(
        name: impl Into<String>,
        providers: Vec<Arc<dyn EmbeddingProvider>>,
        config: GroupConfig,
    ) -> Result<Self> {
        config.validate().map_err(EmbedPoolError::configuration)?;
        if providers.is_empty() {
            return Err(EmbedPoolError::validation(
                "a model group needs at least one provider",
            ));
        }

        let fingerprint = providers[0].test_embedding().await?;
        let scheduler = LatencyScheduler::new(
            providers.len(),
            config.request_timeout,
            config.try_count_limit,
        );
        let cache = SimilarityCache::new(config.cache_ttl, config.str_threshold);

        Ok(Self {
            name: name.into(),
            config,
            providers: RwLock::new(providers),
            default_index: RwLock::new(0),
            fingerprint,
            cache: Mutex::new(cache),
            scheduler,
        })
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fingerprint vector all pooled providers were admitted against.
    #[must_use]
    pub fn fingerprint(&self) -> &[f32] {
        &self.fingerprint
    }

    /// Number of providers in the pool.
    pub async fn provider_count(&self) -> usize {
        self.providers.read().await.len()
    }

    /// Index of the current default provider.
    pub async fn default_index(&self) -> usize {
        *self.default_index.read().await
    }

    /// Identity of the current default provider.
    pub async fn provider_name(&self) -> String {
        self.default_provider().await.provider_name().to_string()
    }

    /// Embed a single text, consulting the cache first.
    ///
    /// A miss goes to the default provider; the fresh vector is cached
    /// before returning.
    ///
    /// # Errors
    ///
    /// Propagates the provider error on a failed remote call.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        {
            let mut cache = self.cache.lock().await;
            cache.sweep();
            if let Some(hit) = cache.lookup(text) {
                return Ok(hit);
            }
        }

        let provider = self.default_provider().await;
        let embedding = provider.embed(text).await?;
        self.cache
            .lock()
            .await
            .insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    /// Embed a batch of texts, returning vectors in the exact input order.
    ///
    /// Duplicate inputs are computed once and fanned out to every
    /// occurrence. Cached texts never reach a provider. The uncached
    /// residue goes to the default provider in one call when it is small,
    /// and is otherwise chunked and spread across the pool by the
    /// scheduler. On any chunk failure the whole call fails and nothing
    /// from it is written to the cache.
    ///
    /// # Errors
    ///
    /// Propagates provider errors and the scheduler's
    /// [`EmbedPoolError::RetryLimitExceeded`].
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut resolved: HashMap<String, Vec<f32>> = HashMap::new();
        let mut uncached: Vec<String> = Vec::new();
        {
            let mut cache = self.cache.lock().await;
            cache.sweep();
            let mut seen = HashSet::new();
            for text in texts {
                if !seen.insert(text.as_str()) {
                    continue;
                }
                match cache.lookup(text) {
                    Some(hit) => {
                        resolved.insert(text.clone(), hit);
                    }
                    None => uncached.push(text.clone()),
                }
            }
        }

        if !uncached.is_empty() {
            let computed = self.embed_uncached(&uncached).await?;
            if computed.len() != uncached.len() {
                return Err(EmbedPoolError::internal(format!(
                    "expected {} embeddings, providers returned {}",
                    uncached.len(),
                    computed.len()
                )));
            }
            let mut cache = self.cache.lock().await;
            for (text, embedding) in uncached.into_iter().zip(computed) {
                cache.insert(text.clone(), embedding.clone());
                resolved.insert(text, embedding);
            }
        }

        texts
            .iter()
            .map(|text| {
                resolved.get(text).cloned().ok_or_else(|| {
                    EmbedPoolError::internal(format!("no embedding resolved for input {text:?}"))
                })
            })
            .collect()
    }

    /// Admit a provider into the pool iff its test embedding's cosine
    /// similarity to the group fingerprint exceeds `1 - epsilon`.
    ///
    /// A mismatch (including a dimension mismatch or a failed test
    /// embedding) is a normal "not this group" signal, reported as `false`
    /// rather than an error.
    pub async fn add_provider(&self, provider: Arc<dyn EmbeddingProvider>) -> bool {
        let candidate = match provider.test_embedding().await {
            Ok(embedding) => embedding,
            Err(err) => {
                warn!(
                    provider = provider.provider_name(),
                    %err,
                    "test embedding failed, provider not admitted"
                );
                return false;
            }
        };

        match cosine_similarity(&self.fingerprint, &candidate) {
            Ok(similarity) if similarity > 1.0 - self.config.epsilon => {
                info!(
                    provider = provider.provider_name(),
                    group = %self.name,
                    similarity,
                    "provider admitted into group"
                );
                self.providers.write().await.push(provider);
                self.scheduler.register_backend().await;
                true
            }
            Ok(similarity) => {
                debug!(
                    provider = provider.provider_name(),
                    group = %self.name,
                    similarity,
                    "fingerprint similarity below admission threshold"
                );
                false
            }
            Err(err) => {
                debug!(
                    provider = provider.provider_name(),
                    group = %self.name,
                    %err,
                    "fingerprint comparison failed"
                );
                false
            }
        }
    }

    /// Select the default provider by pool index.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedPoolError::IndexOutOfRange`] for an invalid index;
    /// the current default is left unchanged.
    pub async fn set_default_provider(&self, index: usize) -> Result<()> {
        let len = self.providers.read().await.len();
        if index >= len {
            return Err(EmbedPoolError::IndexOutOfRange { index, len });
        }
        *self.default_index.write().await = index;
        Ok(())
    }

    /// Whether every pooled provider passes its liveness check.
    ///
    /// A conjunction: one unavailable provider marks the whole group
    /// degraded.
    pub async fn is_available(&self) -> bool {
        let providers = self.providers.read().await.clone();
        let probes = providers.iter().map(|p| p.is_available());
        future::join_all(probes).await.into_iter().all(|ok| ok)
    }

    /// Dimensionality of the group's embedding space, delegated to the
    /// first provider.
    ///
    /// # Errors
    ///
    /// Propagates the provider error if the dimension cannot be determined.
    pub async fn dimension(&self) -> Result<usize> {
        let first = Arc::clone(&self.providers.read().await[0]);
        first.dimension().await
    }

    /// Per-provider identity and live availability, in pool order.
    pub async fn backend_status(&self) -> Vec<BackendStatus> {
        let providers = self.providers.read().await.clone();
        let probes = providers.iter().map(|p| p.is_available());
        let results = future::join_all(probes).await;
        providers
            .iter()
            .zip(results)
            .map(|(provider, available)| BackendStatus {
                provider: provider.provider_name().to_string(),
                model: provider.model_name().to_string(),
                available,
            })
            .collect()
    }

    /// Per-backend scheduler state, for inspection.
    pub async fn scheduler_state(&self) -> Vec<BackendState> {
        self.scheduler.snapshot().await
    }

    /// Number of live-or-stale entries currently in the cache.
    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn default_provider(&self) -> Arc<dyn EmbeddingProvider> {
        let providers = self.providers.read().await;
        let index = *self.default_index.read().await;
        Arc::clone(&providers[index])
    }

    /// Route the uncached residue: small batches go straight to the
    /// default provider, larger ones are chunked and scheduled across the
    /// pool.
    async fn embed_uncached(&self, uncached: &[String]) -> Result<Vec<Vec<f32>>> {
        if uncached.len() < self.config.balance_threshold {
            let provider = self.default_provider().await;
            debug!(
                provider = provider.provider_name(),
                items = uncached.len(),
                "small batch routed to default provider"
            );
            return provider.embed_batch(uncached).await;
        }

        let providers = self.providers.read().await.clone();
        let chunks: Vec<&[String]> = uncached.chunks(self.config.batch_size).collect();
        info!(
            group = %self.name,
            items = uncached.len(),
            chunks = chunks.len(),
            providers = providers.len(),
            "balancing batch across provider pool"
        );

        let dispatches = chunks
            .iter()
            .map(|chunk| self.scheduler.dispatch(&providers, chunk));
        let results = future::try_join_all(dispatches).await?;

        let mut embeddings = Vec::with_capacity(uncached.len());
        for chunk_result in results {
            embeddings.extend(chunk_result);
        }
        Ok(embeddings)
    }
}
