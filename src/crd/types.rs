//! Shared types for HttpCheck specifications and status

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of the last reconciliation of a check
///
/// A status without a state has not been reconciled yet.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum CheckState {
    /// The Pingdom check matches the spec
    Succeeded,
    /// The spec is invalid or Pingdom rejected it; see `status.error`
    #[serde(alias = "Fail")]
    Failed,
}

impl std::fmt::Display for CheckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckState::Succeeded => write!(f, "Succeeded"),
            CheckState::Failed => write!(f, "Failed"),
        }
    }
}
