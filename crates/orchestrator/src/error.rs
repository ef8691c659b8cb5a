//! Error types for orchestrator operations.

use completion_core::CompletionError;
use database::DatabaseError;
use thiserror::Error;

use crate::view::ViewError;

/// Errors that can occur while handling a send.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The request was malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Non-exempt caller with a balance of zero or less.
    #[error("insufficient credits")]
    InsufficientCredits,

    /// The upstream call failed. Propagated verbatim.
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The session (or user) does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The session belongs to someone else.
    #[error("{entity} {id} belongs to another user")]
    Forbidden { entity: &'static str, id: String },

    /// Local conversation view misuse.
    #[error(transparent)]
    View(#[from] ViewError),

    /// Any other storage failure.
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for OrchestratorError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => Self::NotFound { entity, id },
            DatabaseError::Forbidden { entity, id } => Self::Forbidden { entity, id },
            DatabaseError::Validation(e) => Self::Validation(e.to_string()),
            other => Self::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::ValidationError;

    #[test]
    fn test_database_errors_are_lifted() {
        let err: OrchestratorError = DatabaseError::NotFound {
            entity: "ChatSession",
            id: "s1".into(),
        }
        .into();
        assert!(matches!(err, OrchestratorError::NotFound { entity: "ChatSession", .. }));

        let err: OrchestratorError =
            DatabaseError::Validation(ValidationError::Empty("title".into())).into();
        assert!(matches!(err, OrchestratorError::Validation(ref m) if m == "title cannot be empty"));
    }
}
