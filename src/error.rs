//! Central error types for the Pingdom operator
//!
//! Uses `thiserror` for ergonomic, type-safe error handling with
//! automatic `Display` and `Error` trait implementations.

use thiserror::Error;

use crate::pingdom::{RemoteError, RemoteErrorKind, ValidationError};

/// Central error type for the Pingdom operator
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error from kube-rs
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HttpCheck spec could not be turned into a check descriptor
    #[error("Check validation error: {0}")]
    ValidationError(#[from] ValidationError),

    /// Error reported by (or while talking to) the Pingdom API
    #[error("Pingdom error: {0}")]
    RemoteError(#[from] RemoteError),

    /// The Pingdom check behind a deleted HttpCheck could not be removed
    #[error("Pingdom cleanup failed: {0}")]
    CleanupFailed(RemoteError),

    /// HTTP client construction error (from reqwest)
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The check service was installed more than once
    #[error("the httpcheck service has already been initialized")]
    AlreadyInitialized,

    /// The check service was requested before it was installed
    #[error("the httpcheck service has not been initialized")]
    NotInitialized,
}

/// Result type alias for operator operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Check if this error type should trigger a retry
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::KubeError(_) | Error::CleanupFailed(_) => true,
            Error::RemoteError(e) => e.kind() == RemoteErrorKind::Transport,
            _ => false,
        }
    }

    /// Convert to a human-readable message for status updates
    pub fn status_message(&self) -> String {
        match self {
            Error::ValidationError(e) => e.to_string(),
            Error::RemoteError(e) | Error::CleanupFailed(e) => e.message().to_string(),
            Error::KubeError(e) => format!("Kubernetes error: {}", e),
            _ => self.to_string(),
        }
    }
}
