//! The Completer trait definition.

use async_trait::async_trait;

use crate::error::CompletionError;
use crate::message::{ChatMessage, Completion, GenerationParams};

/// A single request/response call to an upstream completion service.
///
/// Implementations are stateless per call and must not hold any lock shared
/// with the session store or credit ledger while the call is in flight.
/// This trait is object-safe and can be used as `Arc<dyn Completer>`.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Generate the next assistant turn for `messages` using `model`.
    ///
    /// # Arguments
    ///
    /// * `messages` - Full conversation history, already ending in the new user turn.
    /// * `model` - Upstream model identifier such as `provider/model-name`.
    /// * `params` - Generation parameters.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> Result<Completion, CompletionError>;

    /// Get a human-readable name for this provider.
    fn name(&self) -> &str;
}
