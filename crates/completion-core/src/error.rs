//! Error types for completion providers.

use thiserror::Error;

/// Errors that can occur while talking to the upstream completion service.
///
/// None of these are retried by the orchestrator; they surface to the caller
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// Transport failure, timeout, upstream 5xx or an unreadable response body.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The upstream refused the request (unknown model, malformed request, bad key).
    #[error("upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The upstream is throttling us.
    #[error("upstream rate limited: {0}")]
    RateLimited(String),

    /// The provider could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CompletionError {
    /// Short machine-readable label, used in logs and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Unavailable(_) => "upstream_unavailable",
            CompletionError::Rejected { .. } => "upstream_rejected",
            CompletionError::RateLimited(_) => "upstream_rate_limited",
            CompletionError::Configuration(_) => "configuration_error",
        }
    }
}
