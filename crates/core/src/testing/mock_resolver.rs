//! Mock location resolver for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::provider::{LocationResolver, ProviderError};

/// Mock implementation of the LocationResolver trait.
///
/// Codes without a configured name resolve to themselves.
#[derive(Debug, Default)]
pub struct MockLocationResolver {
    names: Arc<RwLock<HashMap<String, String>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl MockLocationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name for a code.
    pub async fn set_name(&self, code: &str, name: &str) {
        self.names
            .write()
            .await
            .insert(code.to_string(), name.to_string());
    }

    /// Make lookups of a code fail.
    pub async fn set_error(&self, code: &str) {
        self.failing.write().await.insert(code.to_string());
    }

    /// Codes looked up, in call order.
    pub async fn recorded_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }

    pub async fn lookup_count(&self) -> usize {
        self.lookups.read().await.len()
    }
}

#[async_trait]
impl LocationResolver for MockLocationResolver {
    async fn resolve_name(&self, code: &str) -> Result<String, ProviderError> {
        self.lookups.write().await.push(code.to_string());

        if self.failing.read().await.contains(code) {
            return Err(ProviderError::NotFound(code.to_string()));
        }

        Ok(self
            .names
            .read()
            .await
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string()))
    }
}
