//! Maps reconciliation outcomes onto the HttpCheck status
//!
//! Only the status is touched; spec and finalizers are carried over as-is.

use crate::crd::{CheckState, HttpCheck, HttpCheckStatus};
use crate::pingdom::CheckId;

/// Terminal result of converging an HttpCheck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Pingdom holds a check matching the spec
    Synced { id: CheckId },
    /// The spec is invalid or Pingdom refused it; the recorded id is kept
    Rejected { message: String },
    /// The recorded check no longer exists and recreating it was refused
    Lost { message: String },
}

/// Return a copy of `check` with its status rewritten for `outcome`
pub fn report(check: &HttpCheck, outcome: Outcome) -> HttpCheck {
    let previous = check.status.clone().unwrap_or_default();
    let observed_generation = check.metadata.generation.or(previous.observed_generation);

    let status = match outcome {
        Outcome::Synced { id } => HttpCheckStatus {
            pingdom_id: Some(id),
            pingdom_status: Some(CheckState::Succeeded),
            error: None,
            observed_generation,
        },
        Outcome::Rejected { message } => HttpCheckStatus {
            pingdom_id: previous.pingdom_id,
            pingdom_status: Some(CheckState::Failed),
            error: Some(non_empty(message)),
            observed_generation,
        },
        Outcome::Lost { message } => HttpCheckStatus {
            pingdom_id: None,
            pingdom_status: Some(CheckState::Failed),
            error: Some(non_empty(message)),
            observed_generation,
        },
    };

    let mut reported = check.clone();
    reported.status = Some(status);
    reported
}

// A Failed state always carries a message
fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        "unknown error".to_string()
    } else {
        message
    }
}
