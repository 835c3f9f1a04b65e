//! Error types for the oqim-link client.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OqimLinkError>;

/// Errors surfaced by oqim-link operations.
///
/// Credential and validation rejections carry the backend's own message
/// verbatim so the caller can show it to the user unchanged.
#[derive(Error, Debug)]
pub enum OqimLinkError {
    /// Client-side configuration problem (bad builder input, double init).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The backend rejected the supplied credentials or sign-up data.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// A user-scoped operation was attempted without an authenticated session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend answered with a non-success status outside the
    /// credential-rejection family.
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// Transport-level failure (DNS, TCP, TLS, connection reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request or response body could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An operation exceeded its transport timeout.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// Invariant violation inside the SDK itself.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<reqwest::Error> for OqimLinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OqimLinkError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            OqimLinkError::SerializationError(err.to_string())
        } else {
            OqimLinkError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OqimLinkError {
    fn from(err: serde_json::Error) -> Self {
        OqimLinkError::SerializationError(err.to_string())
    }
}
