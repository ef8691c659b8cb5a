//! Delayed completer - wraps another completer with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use completion_core::{ChatMessage, Completer, Completion, CompletionError, GenerationParams};
use tokio::time::sleep;

/// A completer that wraps another completer and adds artificial delay.
///
/// Useful for exercising concurrent sends and for checking that nothing is
/// locked while the upstream call is in flight.
pub struct DelayedCompleter<C: Completer> {
    inner: C,
    delay: Duration,
}

impl<C: Completer> DelayedCompleter<C> {
    /// Create a new DelayedCompleter wrapping `inner` with the specified delay.
    pub fn new(inner: C, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a completer with a delay in milliseconds.
    pub fn with_millis(inner: C, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Get the wrapped completer.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: Completer> Completer for DelayedCompleter<C> {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> Result<Completion, CompletionError> {
        sleep(self.delay).await;
        self.inner.complete(messages, model, params).await
    }

    fn name(&self) -> &str {
        "DelayedCompleter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EchoCompleter;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_completer() {
        let completer = DelayedCompleter::with_millis(EchoCompleter::new(), 100);

        let start = Instant::now();
        let reply = completer
            .complete(&[ChatMessage::user("test")], "m", &GenerationParams::default())
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(reply.content, "test");
        assert!(elapsed >= Duration::from_millis(100));
        assert_eq!(completer.inner().calls(), 1);
    }

    #[test]
    fn test_completer_name() {
        let completer = DelayedCompleter::with_millis(EchoCompleter::new(), 0);
        assert_eq!(completer.name(), "DelayedCompleter");
    }
}
