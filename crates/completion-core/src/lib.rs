//! Core traits and types for upstream chat completion providers.
//!
//! This crate provides the shared interface between the request orchestrator
//! and whatever service actually generates completions. It defines:
//!
//! - [`Completer`] - The trait every completion provider implements
//! - [`ModelCatalog`] - Read-only access to the list of upstream models
//! - [`CachedCatalog`] - A freshness-bounded cache in front of any catalog
//! - [`ChatMessage`] / [`Completion`] / [`TokenUsage`] - Request and response types
//! - [`CompletionError`] - The upstream failure taxonomy
//!
//! # Example
//!
//! ```rust
//! use completion_core::{
//!     async_trait, ChatMessage, Completer, Completion, CompletionError, GenerationParams,
//!     TokenUsage,
//! };
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Completer for Canned {
//!     async fn complete(
//!         &self,
//!         _messages: &[ChatMessage],
//!         model: &str,
//!         _params: &GenerationParams,
//!     ) -> Result<Completion, CompletionError> {
//!         Ok(Completion::new(model, "Hello!", TokenUsage::new(3, 2)))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Canned"
//!     }
//! }
//! ```

mod catalog;
mod completer;
mod error;
mod message;

pub use catalog::{CachedCatalog, ModelCatalog, ModelInfo};
pub use completer::Completer;
pub use error::CompletionError;
pub use message::{ChatMessage, Completion, GenerationParams, Role, TokenUsage};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
