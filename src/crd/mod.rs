//! Custom Resource Definitions for the Pingdom operator
//!
//! This module defines the Kubernetes CRDs for declaring Pingdom checks.

mod http_check;
#[cfg(test)]
mod tests;
mod types;

pub use http_check::{HttpCheck, HttpCheckSpec, HttpCheckStatus};
pub use types::CheckState;
