//! Drafter error types.

use thiserror::Error;

/// Errors that can occur when talking to a drafting backend.
#[derive(Debug, Error)]
pub enum DrafterError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend replied but the reply was not a usable question draft.
    #[error("malformed draft: {0}")]
    MalformedDraft(String),
}
