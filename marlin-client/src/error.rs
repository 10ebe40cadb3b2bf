//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or server unreachable; generic and retryable
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Wrong credentials or wrong OTP; surfaced inline on the current step
    #[error("{0}")]
    Rejected(String),

    /// The backend no longer accepts the session token
    #[error("Session expired")]
    SessionExpired,

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Operation not valid in the flow's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Server-side failure
    #[error("Server error: {0}")]
    Server(String),

    /// Persisted-token storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Server(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
