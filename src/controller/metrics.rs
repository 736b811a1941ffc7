//! Prometheus metrics for the Pingdom operator

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use crate::pingdom::RemoteErrorKind;

/// What a reconciliation pass ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    FinalizerAdded,
    Created,
    Updated,
    Recreated,
    Deleted,
    InvalidSpec,
    Rejected,
    Retry,
}

impl ReconcileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileAction::FinalizerAdded => "finalizer_added",
            ReconcileAction::Created => "created",
            ReconcileAction::Updated => "updated",
            ReconcileAction::Recreated => "recreated",
            ReconcileAction::Deleted => "deleted",
            ReconcileAction::InvalidSpec => "invalid_spec",
            ReconcileAction::Rejected => "rejected",
            ReconcileAction::Retry => "retry",
        }
    }
}

/// Labels for the reconciliation counter
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ReconcileLabels {
    pub action: String,
}

/// Labels for the remote error counter
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RemoteErrorLabels {
    pub operation: String,
    pub kind: String,
}

/// Reconciliation passes by outcome
pub static RECONCILIATIONS: Lazy<Family<ReconcileLabels, Counter>> = Lazy::new(Family::default);

/// Failed Pingdom API calls by operation and error kind
pub static REMOTE_ERRORS: Lazy<Family<RemoteErrorLabels, Counter>> = Lazy::new(Family::default);

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();
    registry.register(
        "pingdom_operator_reconciliations",
        "Reconciliation passes by resulting action",
        RECONCILIATIONS.clone(),
    );
    registry.register(
        "pingdom_operator_remote_errors",
        "Failed Pingdom API calls by operation and error kind",
        REMOTE_ERRORS.clone(),
    );
    registry
});

pub fn record_reconcile(action: ReconcileAction) {
    let labels = ReconcileLabels {
        action: action.as_str().to_string(),
    };
    RECONCILIATIONS.get_or_create(&labels).inc();
}

pub fn record_remote_error(operation: &str, kind: RemoteErrorKind) {
    let labels = RemoteErrorLabels {
        operation: operation.to_string(),
        kind: kind.as_str().to_string(),
    };
    REMOTE_ERRORS.get_or_create(&labels).inc();
}

/// Render the registry in the OpenMetrics text format
pub fn encode() -> Result<String, std::fmt::Error> {
    let mut buffer = String::new();
    prometheus_client::encoding::text::encode(&mut buffer, &REGISTRY)?;
    Ok(buffer)
}
