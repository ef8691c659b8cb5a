//! OpenRouter-backed completion provider.
//!
//! This crate talks to the OpenRouter aggregation API and exposes it through
//! the [`completion_core::Completer`] and [`completion_core::ModelCatalog`]
//! traits.
//!
//! # Features
//!
//! - Single request/response chat completions (`stream: false`)
//! - Random API key selection across up to four configured keys
//! - Upstream failures classified as unavailable / rejected / rate limited
//! - Model listing, meant to sit behind a [`completion_core::CachedCatalog`]
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use completion_core::{ChatMessage, Completer, GenerationParams};
//! use openrouter_client::OpenRouterClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenRouterClient::from_env()?;
//!     let reply = client
//!         .complete(
//!             &[ChatMessage::user("Hello!")],
//!             "mistralai/mistral-7b-instruct:free",
//!             &GenerationParams::default(),
//!         )
//!         .await?;
//!     println!("{} ({} tokens)", reply.content, reply.usage.total_tokens);
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::OpenRouterClient;
pub use config::{OpenRouterConfig, OpenRouterConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};
