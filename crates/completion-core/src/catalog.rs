//! Upstream model catalog access and caching.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::CompletionError;

/// One entry of the upstream model list.
///
/// Only `id` is required; every other field the upstream sends is kept in
/// `extra` so the API can pass the record through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier, e.g. `mistralai/mistral-7b-instruct:free`.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Context window in tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    /// Remaining upstream fields (description, pricing, architecture, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelInfo {
    /// Create an entry with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            context_length: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Read-only access to the list of models the upstream offers.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Fetch the current model list.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError>;
}

struct CacheEntry {
    fetched_at: Instant,
    models: Arc<Vec<ModelInfo>>,
}

/// A [`ModelCatalog`] wrapper that serves a cached list until it is older
/// than `ttl`.
///
/// Concurrent refreshes are collapsed: the first caller to find the cache
/// stale fetches, the others wait on the write lock and reuse its result.
pub struct CachedCatalog<C> {
    inner: C,
    ttl: Duration,
    cache: RwLock<Option<CacheEntry>>,
}

impl<C: ModelCatalog> CachedCatalog<C> {
    /// Wrap `inner`, keeping fetched lists for `ttl`.
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Get the model list, refreshing it from the upstream if stale.
    pub async fn models(&self) -> Result<Arc<Vec<ModelInfo>>, CompletionError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref().filter(|e| e.fetched_at.elapsed() < self.ttl) {
                return Ok(entry.models.clone());
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(entry) = cache.as_ref().filter(|e| e.fetched_at.elapsed() < self.ttl) {
            return Ok(entry.models.clone());
        }

        let models = Arc::new(self.inner.list_models().await?);
        debug!(count = models.len(), "Refreshed model catalog");
        *cache = Some(CacheEntry {
            fetched_at: Instant::now(),
            models: models.clone(),
        });

        Ok(models)
    }

    /// Drop the cached list so the next call refetches.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Get the wrapped catalog.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: ModelCatalog> ModelCatalog for CachedCatalog<C> {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        Ok(self.models().await?.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingCatalog {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ModelCatalog for CountingCatalog {
        async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CompletionError::Unavailable("down".into()));
            }
            Ok(vec![ModelInfo::new("openai/gpt-4o-mini")])
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_is_reused() {
        let catalog = CachedCatalog::new(CountingCatalog::new(), Duration::from_secs(60));

        let first = catalog.models().await.unwrap();
        let second = catalog.models().await.unwrap();

        assert_eq!(first[0].id, "openai/gpt-4o-mini");
        assert_eq!(first, second);
        assert_eq!(catalog.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let catalog = CachedCatalog::new(CountingCatalog::new(), Duration::ZERO);

        catalog.models().await.unwrap();
        catalog.models().await.unwrap();

        assert_eq!(catalog.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let catalog = CachedCatalog::new(CountingCatalog::new(), Duration::from_secs(60));

        catalog.models().await.unwrap();
        catalog.invalidate().await;
        catalog.models().await.unwrap();

        assert_eq!(catalog.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let catalog = CachedCatalog::new(
            CountingCatalog {
                calls: AtomicUsize::new(0),
                fail: true,
            },
            Duration::from_secs(60),
        );

        assert!(catalog.models().await.is_err());
        assert!(catalog.models().await.is_err());
        assert_eq!(catalog.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_model_info_keeps_unknown_fields() {
        let json = r#"{"id":"a/b","name":"B","context_length":8192,"pricing":{"prompt":"0"}}"#;
        let info: ModelInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.id, "a/b");
        assert_eq!(info.context_length, Some(8192));
        assert!(info.extra.contains_key("pricing"));

        let back = serde_json::to_value(&info).unwrap();
        assert_eq!(back["pricing"]["prompt"], "0");
    }
}
