//! # Embedpool Providers
//!
//! HTTP adapters implementing [`embedpool_core::EmbeddingProvider`] for
//! remote embedding services:
//!
//! - **OpenAI-compatible** endpoints (`/embeddings` contract, bearer auth)
//! - **Ollama** daemons (`/api/embeddings`)
//! - **Gemini** (`:embedContent` / `:batchEmbedContents`)
//!
//! Adapters are usually constructed through the [`factory`] by kind name,
//! then registered with an [`embedpool_core::GroupRegistry`], which places
//! each one into the group matching its embedding space.
//!
//! ```rust,no_run
//! use embedpool_core::{GroupConfig, GroupRegistry};
//! use embedpool_providers::{ProviderConfig, build_provider};
//!
//! # async fn example() -> embedpool_core::Result<()> {
//! let registry = GroupRegistry::new(GroupConfig::default());
//!
//! let ollama = build_provider(
//!     "ollama",
//!     ProviderConfig::ollama("http://localhost:11434", "nomic-embed-text"),
//! )?;
//! let group_name = registry.register(ollama).await?;
//! println!("provider joined group {group_name}");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod factory;
pub mod gemini;
mod http;
pub mod ollama;
pub mod openai;

pub use config::ProviderConfig;
pub use factory::{SUPPORTED_KINDS, build_provider};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
