//! Configuration for model groups.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`crate::group::ModelGroup`] and its scheduler.
///
/// The defaults reproduce the documented routing policy: a 20 second cache
/// TTL, a 0.9 text-similarity threshold, batches below 10 items going to
/// the default provider, 8-item chunks above that, a 10 second per-attempt
/// timeout and a budget of 10 retries per chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Cache entry time to live
    pub cache_ttl: Duration,

    /// Jaccard similarity above which a cached entry counts as a hit
    pub str_threshold: f64,

    /// Admission tolerance: a provider joins a group iff the cosine
    /// similarity of its test embedding to the group fingerprint exceeds
    /// `1 - epsilon`
    pub epsilon: f64,

    /// Uncached batches smaller than this go to the default provider in a
    /// single call, skipping the scheduler entirely
    pub balance_threshold: usize,

    /// Chunk size when a batch is spread across the provider pool
    pub batch_size: usize,

    /// Fixed timeout for one dispatch attempt against one provider
    pub request_timeout: Duration,

    /// Number of failed attempts after which a chunk is abandoned
    pub try_count_limit: usize,
}

impl GroupConfig {
    /// Set the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the text-similarity threshold for cache hits.
    #[must_use]
    pub fn with_str_threshold(mut self, threshold: f64) -> Self {
        self.str_threshold = threshold;
        self
    }

    /// Set the balance threshold.
    #[must_use]
    pub fn with_balance_threshold(mut self, threshold: usize) -> Self {
        self.balance_threshold = threshold;
        self
    }

    /// Set the chunk size for balanced dispatch.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the per-attempt request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the per-chunk retry budget.
    #[must_use]
    pub fn with_try_count_limit(mut self, limit: usize) -> Self {
        self.try_count_limit = limit;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl.is_zero() {
            return Err("Cache TTL must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.str_threshold) {
            return Err("Text similarity threshold must be within [0, 1]".to_string());
        }
        if self.epsilon <= 0.0 || self.epsilon >= 1.0 {
            return Err("Epsilon must be within (0, 1)".to_string());
        }
        if self.batch_size == 0 {
            return Err("Batch size must be greater than 0".to_string());
        }
        if self.request_timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.try_count_limit == 0 {
            return Err("Retry budget must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(20),
            str_threshold: 0.9,
            epsilon: 1e-6,
            balance_threshold: 10,
            batch_size: 8,
            request_timeout: Duration::from_secs(10),
            try_count_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GroupConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl, Duration::from_secs(20));
        assert_eq!(config.balance_threshold, 10);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.try_count_limit, 10);
    }

    #[test]
    fn test_config_builder_methods() {
        let config = GroupConfig::default()
            .with_cache_ttl(Duration::from_secs(60))
            .with_str_threshold(0.8)
            .with_balance_threshold(4)
            .with_batch_size(2)
            .with_request_timeout(Duration::from_secs(5))
            .with_try_count_limit(3);

        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.str_threshold, 0.8);
        assert_eq!(config.balance_threshold, 4);
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.try_count_limit, 3);
    }

    #[test]
    fn test_config_validation() {
        let valid = GroupConfig::default();
        assert!(valid.validate().is_ok());

        let mut invalid = valid.clone();
        invalid.batch_size = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.str_threshold = 1.5;
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.request_timeout = Duration::ZERO;
        assert!(invalid.validate().is_err());

        let mut invalid = valid;
        invalid.try_count_limit = 0;
        assert!(invalid.validate().is_err());
    }
}
