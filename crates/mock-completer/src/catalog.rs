//! Static model catalog.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use completion_core::{CompletionError, ModelCatalog, ModelInfo};

/// A catalog that always returns the same model ids.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    models: Vec<ModelInfo>,
    calls: AtomicUsize,
}

impl StaticCatalog {
    /// Serve one entry per id.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: ids.into_iter().map(ModelInfo::new).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the list was requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelCatalog for StaticCatalog {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.models.clone())
    }
}
