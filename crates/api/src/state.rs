//! Application state shared across handlers.

use std::sync::Arc;

use completion_core::ModelCatalog;
use database::Database;
use orchestrator::Orchestrator;

use crate::auth::TokenIssuer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Send pipeline.
    pub orchestrator: Orchestrator,
    /// Cached upstream model list.
    pub catalog: Arc<dyn ModelCatalog>,
    /// Bearer token issuer.
    pub tokens: Arc<TokenIssuer>,
    /// Balance given to new registrations.
    pub new_user_credits: i64,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        orchestrator: Orchestrator,
        catalog: Arc<dyn ModelCatalog>,
        tokens: TokenIssuer,
        new_user_credits: i64,
    ) -> Self {
        Self {
            db,
            orchestrator,
            catalog,
            tokens: Arc::new(tokens),
            new_user_credits,
        }
    }
}
