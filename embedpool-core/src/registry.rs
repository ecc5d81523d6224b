//! Grouping of providers by measured embedding-space equivalence.
//!
//! The registry offers every incoming provider to the existing groups in
//! creation order; the first group whose fingerprint matches admits it.
//! Providers nobody admits seed a fresh group named after their model
//! label.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::GroupConfig;
use crate::error::{EmbedPoolError, Result};
use crate::group::{BackendStatus, ModelGroup};
use crate::provider::EmbeddingProvider;

/// One group's listing entry: name, default selection, and per-backend
/// availability.
#[derive(Debug, Clone)]
pub struct GroupStatus {
    /// Group name.
    pub name: String,
    /// Index of the currently selected default provider.
    pub default_index: usize,
    /// Pooled providers with live availability, in pool order.
    pub backends: Vec<BackendStatus>,
}

/// Registry of model groups keyed by embedding-space equivalence.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<Vec<Arc<ModelGroup>>>,
    config: GroupConfig,
}

impl GroupRegistry {
    /// Create an empty registry; new groups inherit `config`.
    #[must_use]
    pub fn new(config: GroupConfig) -> Self {
        Self {
            groups: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Route a provider into the first group that admits it, or create a
    /// new group for it. Returns the name of the group it landed in.
    ///
    /// # Errors
    ///
    /// Fails only when a fresh group cannot be created, e.g. because the
    /// provider cannot produce its test embedding.
    pub async fn register(&self, provider: Arc<dyn EmbeddingProvider>) -> Result<String> {
        let existing = self.groups.read().await.clone();
        for group in &existing {
            if group.add_provider(Arc::clone(&provider)).await {
                return Ok(group.name().to_string());
            }
        }

        let name = self.unique_name(provider.model_name()).await;
        info!(
            provider = provider.provider_name(),
            group = %name,
            "no matching group, creating a new one"
        );
        let group =
            Arc::new(ModelGroup::new(name.clone(), vec![provider], self.config.clone()).await?);
        self.groups.write().await.push(group);
        Ok(name)
    }

    /// Look up a group by name.
    pub async fn group(&self, name: &str) -> Option<Arc<ModelGroup>> {
        self.groups
            .read()
            .await
            .iter()
            .find(|group| group.name() == name)
            .cloned()
    }

    /// Names of all groups, in creation order.
    pub async fn group_names(&self) -> Vec<String> {
        self.groups
            .read()
            .await
            .iter()
            .map(|group| group.name().to_string())
            .collect()
    }

    /// Number of groups.
    pub async fn len(&self) -> usize {
        self.groups.read().await.len()
    }

    /// Whether the registry holds no groups.
    pub async fn is_empty(&self) -> bool {
        self.groups.read().await.is_empty()
    }

    /// Select the default provider of a group by index.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedPoolError::NotFound`] for an unknown group name and
    /// [`EmbedPoolError::IndexOutOfRange`] for an invalid index.
    pub async fn select_default(&self, group_name: &str, index: usize) -> Result<()> {
        let group = self
            .group(group_name)
            .await
            .ok_or_else(|| EmbedPoolError::not_found(group_name))?;
        group.set_default_provider(index).await
    }

    /// List every group with its default selection and live per-backend
    /// availability.
    pub async fn list(&self) -> Vec<GroupStatus> {
        let groups = self.groups.read().await.clone();
        let mut statuses = Vec::with_capacity(groups.len());
        for group in groups {
            statuses.push(GroupStatus {
                name: group.name().to_string(),
                default_index: group.default_index().await,
                backends: group.backend_status().await,
            });
        }
        statuses
    }

    /// Derive a group name from a model label, suffixing on collision.
    async fn unique_name(&self, model: &str) -> String {
        let taken = self.group_names().await;
        if !taken.iter().any(|name| name == model) {
            return model.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{model}-{counter}");
            if !taken.iter().any(|name| name == &candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
