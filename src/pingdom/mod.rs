//! Pingdom integration
//!
//! [`RemoteCheckClient`] is the seam between the reconciler and the uptime
//! service. Errors are returned as a closed [`RemoteError`] enum so callers
//! branch on [`RemoteErrorKind`] instead of inspecting error types.

mod client;
mod http_check;
mod service;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{PingdomClient, PingdomConfig, DEFAULT_BASE_URL};
pub use http_check::{normalize, CheckDescriptor, ValidationError, DEFAULT_RESOLUTION};
pub use service::CheckServiceSlot;

/// Identifier Pingdom assigns to a check
pub type CheckId = u64;

/// Classification of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// The referenced check does not exist
    NotFound,
    /// The request was understood and refused
    Domain,
    /// The service could not be reached or failed internally
    Transport,
}

impl RemoteErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteErrorKind::NotFound => "not_found",
            RemoteErrorKind::Domain => "domain",
            RemoteErrorKind::Transport => "transport",
        }
    }
}

/// Error returned by a [`RemoteCheckClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("check not found: {0}")]
    NotFound(String),

    #[error("request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

impl RemoteError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::NotFound(_) => RemoteErrorKind::NotFound,
            RemoteError::Rejected { .. } => RemoteErrorKind::Domain,
            RemoteError::Transport(_) => RemoteErrorKind::Transport,
        }
    }

    /// Message as reported by the service, without our own prefix
    pub fn message(&self) -> &str {
        match self {
            RemoteError::NotFound(message)
            | RemoteError::Rejected { message, .. }
            | RemoteError::Transport(message) => message,
        }
    }
}

/// Create, update and delete checks on the uptime service
#[async_trait]
pub trait RemoteCheckClient: Send + Sync {
    /// Create a new check and return the id the service assigned to it
    async fn create(&self, check: &CheckDescriptor) -> Result<CheckId, RemoteError>;

    /// Replace the configuration of an existing check
    async fn update(&self, id: CheckId, check: &CheckDescriptor) -> Result<(), RemoteError>;

    /// Delete a check
    async fn delete(&self, id: CheckId) -> Result<(), RemoteError>;
}
