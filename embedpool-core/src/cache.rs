//! Similarity-aware embedding cache.
//!
//! Entries are keyed by the exact stored text but matched approximately:
//! a lookup scans all live entries and returns the first one whose stored
//! text exceeds the Jaccard threshold against the query. This trades
//! precision for hit rate on near-duplicate prompts (same text with
//! different punctuation, digits, or casing). Expiry is purely
//! access-triggered; there is no background sweeper task.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::similarity::text_similarity;

/// A cached embedding with its insertion timestamp.
#[derive(Debug, Clone)]
struct CacheEntry {
    embedding: Vec<f32>,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// In-memory cache with approximate text matching and TTL expiry.
///
/// Lookup is a linear scan; the expected entry count stays small because
/// entries expire after the TTL. Scan order is unspecified: when several
/// entries exceed the threshold, the first one encountered wins.
#[derive(Debug)]
pub struct SimilarityCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
    threshold: f64,
}

impl SimilarityCache {
    /// Create a new cache with the given TTL and similarity threshold.
    #[must_use]
    pub fn new(ttl: Duration, threshold: f64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            threshold,
        }
    }

    /// Find a usable embedding for `text`.
    ///
    /// Returns the value of the first live entry whose stored text has
    /// Jaccard similarity with `text` above the threshold.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<Vec<f32>> {
        for (stored, entry) in &self.entries {
            if entry.is_expired(self.ttl) {
                continue;
            }
            if text_similarity(stored, text) > self.threshold {
                debug!(stored = stored.as_str(), query = text, "similarity cache hit");
                return Some(entry.embedding.clone());
            }
        }
        None
    }

    /// Store or overwrite the entry for `text` with the current timestamp.
    pub fn insert(&mut self, text: String, embedding: Vec<f32>) {
        self.entries.insert(
            text,
            CacheEntry {
                embedding,
                created_at: Instant::now(),
            },
        );
    }

    /// Remove every entry whose age reached the TTL.
    ///
    /// Called at the start of every group-level read to bound memory and
    /// staleness. Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "cache sweep");
        }
        removed
    }

    /// Number of stored entries, including not-yet-swept expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> SimilarityCache {
        SimilarityCache::new(Duration::from_secs(20), 0.9)
    }

    #[tokio::test]
    async fn test_exact_hit() {
        let mut cache = cache();
        cache.insert("hello world".to_string(), vec![1.0, 2.0]);
        assert_eq!(cache.lookup("hello world"), Some(vec![1.0, 2.0]));
    }

    #[tokio::test]
    async fn test_near_duplicate_hit() {
        let mut cache = cache();
        cache.insert("Hello, World!".to_string(), vec![1.0, 2.0]);
        // Case, punctuation and digits are ignored by the matcher.
        assert_eq!(cache.lookup("hello world 42"), Some(vec![1.0, 2.0]));
    }

    #[tokio::test]
    async fn test_dissimilar_miss() {
        let mut cache = cache();
        cache.insert("hello world".to_string(), vec![1.0, 2.0]);
        assert_eq!(cache.lookup("xyz987"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_not_returned() {
        let mut cache = cache();
        cache.insert("hello world".to_string(), vec![1.0]);
        tokio::time::advance(Duration::from_secs(21)).await;
        assert_eq!(cache.lookup("hello world"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let mut cache = cache();
        cache.insert("old".to_string(), vec![1.0]);
        tokio::time::advance(Duration::from_secs(15)).await;
        cache.insert("fresh".to_string(), vec![2.0]);
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("fresh"), Some(vec![2.0]));
    }

    #[tokio::test]
    async fn test_insert_overwrites() {
        let mut cache = cache();
        cache.insert("hello".to_string(), vec![1.0]);
        cache.insert("hello".to_string(), vec![2.0]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup("hello"), Some(vec![2.0]));
    }
}
