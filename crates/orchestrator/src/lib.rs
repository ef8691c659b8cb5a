//! Credit-metered chat request orchestration.
//!
//! This crate provides the [`Orchestrator`] type which runs one chat send
//! end to end against the credit ledger, the session store and an upstream
//! [`Completer`](completion_core::Completer).
//!
//! # Architecture
//!
//! ```text
//! SendRequest (from the HTTP layer) + RequestContext
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Validate: last message is a non-empty user turn         │
//! │         ↓                                                   │
//! │  2. Admission: exempt, or balance > 0                       │
//! │         ↓                                                   │
//! │  3. Resolve session: check owner, or plan a new one         │
//! │         ↓                                                   │
//! │  4. Invoke upstream (no lock or connection held)            │
//! │         ↓                                                   │
//! │  5. Persist exchange (creates the planned session)          │
//! │         ↓                                                   │
//! │  6. Settle: debit usage.total_tokens                        │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! SendOutcome (reply, usage, session id, balance)
//! ```
//!
//! Any failing step ends the send. Usage is only charged once the exchange
//! is stored.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orchestrator::{Orchestrator, RequestContext, SendRequest};
//!
//! let orchestrator = Orchestrator::new(db, Arc::new(client), "mistralai/mistral-7b-instruct:free");
//! let ctx = RequestContext::new(user.id, user.username, user.is_admin);
//!
//! let outcome = orchestrator
//!     .send(&ctx, SendRequest { messages, ..SendRequest::default() })
//!     .await?;
//! println!("{} (balance: {})", outcome.completion.content, outcome.balance);
//! ```

mod context;
mod error;
mod orchestrator;
mod view;

pub use context::RequestContext;
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, SendOutcome, SendRequest};
pub use view::{ConversationView, ViewError};
