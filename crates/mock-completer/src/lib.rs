//! Mock completion providers for testing.
//!
//! This crate provides mock implementations of the `Completer` and
//! `ModelCatalog` traits:
//! - `EchoCompleter` - Echoes the last user turn with a fixed token usage
//! - `FailingCompleter` - Always fails with a chosen upstream error
//! - `DelayedCompleter` - Wraps another completer with artificial latency
//! - `StaticCatalog` - Serves a fixed model list
//!
//! Every completer counts its calls so tests can assert that the upstream
//! was (or was not) reached.
//!
//! For production use, see the `openrouter-client` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_completer::{ChatMessage, Completer, EchoCompleter, GenerationParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_completer::CompletionError> {
//!     let completer = EchoCompleter::new().with_usage(37);
//!
//!     let reply = completer
//!         .complete(&[ChatMessage::user("Hello!")], "mock/model", &GenerationParams::default())
//!         .await?;
//!     assert_eq!(reply.content, "Hello!");
//!     assert_eq!(reply.usage.total_tokens, 37);
//!     Ok(())
//! }
//! ```

mod catalog;
mod delayed;
mod echo;
mod failing;

// Re-export completion-core types for convenience
pub use completion_core::{
    async_trait, ChatMessage, Completer, Completion, CompletionError, GenerationParams,
    ModelCatalog, ModelInfo, Role, TokenUsage,
};

pub use catalog::StaticCatalog;
pub use delayed::DelayedCompleter;
pub use echo::EchoCompleter;
pub use failing::FailingCompleter;
