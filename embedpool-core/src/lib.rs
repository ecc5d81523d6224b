//! # Embedpool Core
//!
//! A unified embedding-vector request interface over pools of
//! interchangeable remote providers, grouped by the embedding space they
//! produce.
//!
//! The crate provides:
//!
//! - **[`EmbeddingProvider`]**: the capability trait remote adapters implement
//! - **[`SimilarityCache`]**: TTL-bounded cache with approximate text matching
//! - **[`LatencyScheduler`]**: EMA-based least-latency dispatch with bounded retries
//! - **[`ModelGroup`]**: the group-level router combining cache and scheduler
//! - **[`GroupRegistry`]**: groups providers by measured embedding equivalence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use embedpool_core::{GroupConfig, GroupRegistry};
//! # use embedpool_core::EmbeddingProvider;
//!
//! # async fn example(provider: Arc<dyn EmbeddingProvider>) -> embedpool_core::Result<()> {
//! let registry = GroupRegistry::new(GroupConfig::default());
//! let group_name = registry.register(provider).await?;
//! let group = registry.group(&group_name).await.unwrap();
//!
//! let vectors = group
//!     .embed_batch(&["hello".to_string(), "world".to_string()])
//!     .await?;
//! assert_eq!(vectors.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Routing policy
//!
//! Every request sweeps and consults the cache first. The uncached residue
//! of a batch goes to the group's default provider when small; above the
//! balance threshold it is split into fixed-size chunks dispatched
//! concurrently, each to the free provider with the lowest rolling
//! latency. Failed attempts penalize a provider's latency score and the
//! chunk retries elsewhere, up to a fixed budget. Output order always
//! matches input order; batch calls fully succeed or fully fail.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod provider;
pub mod registry;
pub mod scheduler;
pub mod similarity;

// Re-export key types at crate root for convenience
pub use cache::SimilarityCache;
pub use config::GroupConfig;
pub use error::{EmbedPoolError, Result};
pub use group::{BackendStatus, ModelGroup};
pub use provider::EmbeddingProvider;
pub use registry::{GroupRegistry, GroupStatus};
pub use scheduler::{BackendState, LatencyScheduler};
pub use similarity::{TEST_SENTENCE, cosine_similarity, text_similarity};

/// Version information for the embedpool core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the embedpool core library.
pub const NAME: &str = env!("CARGO_PKG_NAME");
