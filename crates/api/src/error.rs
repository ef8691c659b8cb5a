//! Error types for the HTTP API.
//!
//! Every failure is rendered as `{"error": {"type": ..., "message": ...}}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use completion_core::CompletionError;
use database::DatabaseError;
use orchestrator::OrchestratorError;
use thiserror::Error;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token, or bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Admission failed.
    #[error("Insufficient credits")]
    InsufficientCredits,

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate username or email.
    #[error("{0}")]
    Conflict(String),

    /// Upstream completion or catalog failure.
    #[error(transparent)]
    Upstream(#[from] CompletionError),

    /// Anything else. Logged, never shown to the client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InsufficientCredits => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(err) => match err {
                CompletionError::Unavailable(_) => StatusCode::BAD_GATEWAY,
                CompletionError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                // 401/403 concern our own upstream key, not the caller's token
                CompletionError::Rejected { status, .. } => StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| {
                        s.is_client_error()
                            && *s != StatusCode::UNAUTHORIZED
                            && *s != StatusCode::FORBIDDEN
                    })
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                CompletionError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "validation_error",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::InsufficientCredits => "insufficient_credits",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Upstream(CompletionError::Configuration(_)) => "internal_error",
            ApiError::Upstream(err) => err.kind(),
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() && !matches!(self, ApiError::Upstream(_)) {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            if status.is_server_error() {
                tracing::warn!(error = %self, "Upstream failure");
            }
            self.to_string()
        };

        let body = serde_json::json!({
            "error": {
                "type": self.kind(),
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, .. } => ApiError::NotFound(format!("{} not found", entity)),
            DatabaseError::Forbidden { entity, .. } => {
                ApiError::Forbidden(format!("{} belongs to another user", entity))
            }
            DatabaseError::AlreadyExists { id, .. } => {
                ApiError::Conflict(format!("{} is already registered", id))
            }
            DatabaseError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            DatabaseError::Validation(e) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<database::ValidationError> for ApiError {
    fn from(err: database::ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::Validation(msg) => ApiError::BadRequest(msg),
            OrchestratorError::InsufficientCredits => ApiError::InsufficientCredits,
            OrchestratorError::Completion(e) => ApiError::Upstream(e),
            OrchestratorError::NotFound { entity, .. } => {
                ApiError::NotFound(format!("{} not found", entity))
            }
            OrchestratorError::Forbidden { entity, .. } => {
                ApiError::Forbidden(format!("{} belongs to another user", entity))
            }
            OrchestratorError::View(e) => ApiError::BadRequest(e.to_string()),
            OrchestratorError::Database(e) => ApiError::from(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the API error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error format.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Result type for route handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InsufficientCredits.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            ApiError::Upstream(CompletionError::Unavailable("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Upstream(CompletionError::RateLimited("x".into())).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Upstream(CompletionError::Rejected {
                status: 404,
                message: "no model".into()
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream(CompletionError::Rejected {
                status: 422,
                message: "bad params".into()
            })
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        for status in [401, 403] {
            assert_eq!(
                ApiError::Upstream(CompletionError::Rejected {
                    status,
                    message: "invalid key".into()
                })
                .status(),
                StatusCode::BAD_GATEWAY
            );
        }
        // Non-4xx rejections cannot be passed through
        assert_eq!(
            ApiError::Upstream(CompletionError::Rejected {
                status: 302,
                message: "moved".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_database_error_mapping() {
        let err = ApiError::from(DatabaseError::AlreadyExists {
            entity: "User",
            id: "alice".into(),
        });
        assert!(matches!(err, ApiError::Conflict(_)));

        let err = ApiError::from(DatabaseError::NotFound {
            entity: "ChatSession",
            id: "s1".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
