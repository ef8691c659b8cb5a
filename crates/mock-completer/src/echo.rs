//! Echo completer - replies with the last user turn.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use completion_core::{
    ChatMessage, Completer, Completion, CompletionError, GenerationParams, Role, TokenUsage,
};

/// A completer that echoes the most recent user message back.
///
/// Every call reports the same token usage, which makes settlement
/// arithmetic easy to assert on.
#[derive(Debug, Default)]
pub struct EchoCompleter {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    /// Usage reported for every call.
    usage: TokenUsage,
    calls: AtomicUsize,
}

impl EchoCompleter {
    /// Create a new EchoCompleter with no prefix and zero usage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoCompleter with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_completer::EchoCompleter;
    ///
    /// let completer = EchoCompleter::with_prefix("Echo: ");
    /// // Will respond with "Echo: <last user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Report `total_tokens` of usage on every call.
    pub fn with_usage(mut self, total_tokens: u32) -> Self {
        self.usage = TokenUsage::total(total_tokens);
        self
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completer for EchoCompleter {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        _params: &GenerationParams,
    ) -> Result<Completion, CompletionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let last_user = messages
            .iter()
            .rev()
            .find(|msg| msg.role == Role::User)
            .map(|msg| msg.content.as_str())
            .unwrap_or_default();

        let content = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, last_user),
            None => last_user.to_string(),
        };

        Ok(Completion::new(model, content, self.usage).with_id(format!("echo-{}", call)))
    }

    fn name(&self) -> &str {
        "EchoCompleter"
    }
}
