//! Progress store error types.

use thiserror::Error;

/// Errors that can occur when talking to a remote progress backend.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The backend rejected the credentials (HTTP 401/403).
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    /// The backend returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProgressError {
    /// Retrying the same request will not help.
    pub fn is_permanent(&self) -> bool {
        match self {
            ProgressError::Unauthenticated(_) => true,
            ProgressError::ApiError { status, .. } => (400..500).contains(status) && *status != 429,
            ProgressError::Timeout(_) | ProgressError::NetworkError(_) => false,
        }
    }
}
