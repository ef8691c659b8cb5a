//! Failing completer - always returns the configured error.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use completion_core::{ChatMessage, Completer, Completion, CompletionError, GenerationParams};

/// A completer that fails every call with the same upstream error.
#[derive(Debug)]
pub struct FailingCompleter {
    error: CompletionError,
    calls: AtomicUsize,
}

impl FailingCompleter {
    /// Fail every call with `error`.
    pub fn new(error: CompletionError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Simulate a transport failure or timeout.
    pub fn unavailable() -> Self {
        Self::new(CompletionError::Unavailable("connection refused".to_string()))
    }

    /// Simulate throttling.
    pub fn rate_limited() -> Self {
        Self::new(CompletionError::RateLimited("Rate limit exceeded".to_string()))
    }

    /// Simulate an unknown model id.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::new(CompletionError::Rejected {
            status,
            message: message.into(),
        })
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completer for FailingCompleter {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _model: &str,
        _params: &GenerationParams,
    ) -> Result<Completion, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "FailingCompleter"
    }
}
