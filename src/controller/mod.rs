//! Controller module for HttpCheck reconciliation
//!
//! This module contains the controller loop, the reconciliation state
//! machine and the helpers it uses to manage finalizers and status.

mod finalizers;
pub mod metrics;
mod reconciler;
mod status;
mod store;

pub use finalizers::{FinalizerSet, HTTP_CHECK_FINALIZER};
pub use reconciler::{run_controller, CheckReconciler, ControllerState};
pub use status::{report, Outcome};
pub use store::{CheckEvent, CheckKey, CheckStore, KubeCheckStore};
