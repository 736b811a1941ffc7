use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::{
    api::{Api, ListParams},
    client::Client,
    runtime::{
        controller::{Action, Controller},
        watcher::Config,
    },
    ResourceExt,
};
use tracing::{debug, error, info, instrument, warn};

use crate::crd::HttpCheck;
use crate::error::{Error, Result};
use crate::pingdom::{normalize, CheckId, RemoteCheckClient, RemoteError, RemoteErrorKind};

use super::finalizers::{FinalizerSet, HTTP_CHECK_FINALIZER};
use super::metrics::{self, ReconcileAction};
use super::status::{self, Outcome};
use super::store::{CheckEvent, CheckKey, CheckStore, KubeCheckStore};

/// Shared state for the controller
pub struct ControllerState {
    pub client: Client,
    pub reconciler: CheckReconciler,
}

impl ControllerState {
    pub fn new(client: Client, checks: Arc<dyn RemoteCheckClient>) -> Self {
        let store = Arc::new(KubeCheckStore::new(client.clone()));
        Self {
            client,
            reconciler: CheckReconciler::new(store, checks),
        }
    }
}

/// Main entry point to start the controller
pub async fn run_controller(state: Arc<ControllerState>) -> Result<()> {
    let http_checks: Api<HttpCheck> = Api::all(state.client.clone());

    info!("Starting HttpCheck controller");

    // Verify CRD exists
    match http_checks.list(&ListParams::default().limit(1)).await {
        Ok(_) => info!("HttpCheck CRD is available"),
        Err(e) => {
            error!("HttpCheck CRD not found. Please install the CRD first: {:?}", e);
            return Err(Error::ConfigError("HttpCheck CRD not installed".to_string()));
        }
    }

    Controller::new(http_checks, Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, state)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled: {}", obj),
                Err(e) => warn!("Reconcile error: {:?}", e),
            }
        })
        .await;

    info!("HttpCheck controller stopped");
    Ok(())
}

/// Called by the controller runtime for every change to an HttpCheck.
///
/// At most one pass runs per object at a time.
async fn reconcile(obj: Arc<HttpCheck>, ctx: Arc<ControllerState>) -> Result<Action> {
    let key = CheckKey::from_resource(&obj);
    ctx.reconciler.reconcile(&key).await
}

/// Error policy determines how to handle reconciliation errors
fn error_policy(check: Arc<HttpCheck>, error: &Error, _ctx: Arc<ControllerState>) -> Action {
    metrics::record_reconcile(ReconcileAction::Retry);

    let retry_duration = if error.is_retriable() {
        warn!("Retrying HttpCheck {}: {}", check.name_any(), error);
        Duration::from_secs(15)
    } else {
        error!("Reconciliation error for {}: {:?}", check.name_any(), error);
        Duration::from_secs(60)
    };

    Action::requeue(retry_duration)
}

/// Drives one HttpCheck towards exactly one matching Pingdom check.
///
/// Each pass performs one of: register the finalizer, delete the remote check
/// and release the finalizer, or create/update the remote check and report the
/// outcome in the status. Terminal passes return `Action::await_change()`;
/// anything worth retrying (Kubernetes or Pingdom transport failures) is
/// returned as an error.
pub struct CheckReconciler {
    store: Arc<dyn CheckStore>,
    checks: Arc<dyn RemoteCheckClient>,
}

impl CheckReconciler {
    pub fn new(store: Arc<dyn CheckStore>, checks: Arc<dyn RemoteCheckClient>) -> Self {
        Self { store, checks }
    }

    #[instrument(skip_all, fields(check = %key))]
    pub async fn reconcile(&self, key: &CheckKey) -> Result<Action> {
        let Some(check) = self.store.get(key).await? else {
            debug!("HttpCheck {} no longer exists", key);
            return Ok(Action::await_change());
        };

        if check.is_deleting() {
            return self.cleanup(&check).await;
        }

        let mut finalizers = FinalizerSet::from_slice(check.finalizers());
        if finalizers.add(HTTP_CHECK_FINALIZER) {
            // The write triggers another pass, which continues with the remote work
            info!("Adding finalizer to HttpCheck {}", key);
            self.store.replace_finalizers(&check, &finalizers).await?;
            metrics::record_reconcile(ReconcileAction::FinalizerAdded);
            return Ok(Action::await_change());
        }

        self.apply(&check).await
    }

    /// Remove the Pingdom check, then release the finalizer
    async fn cleanup(&self, check: &HttpCheck) -> Result<Action> {
        let key = CheckKey::from_resource(check);
        info!("Cleaning up HttpCheck {}", key);

        match check.pingdom_id() {
            None => debug!("No Pingdom check recorded for {}", key),
            Some(id) => match self.checks.delete(id).await {
                Ok(()) => {
                    info!("Deleted Pingdom check {} for {}", id, key);
                    self.store
                        .publish_event(check, CheckEvent::Deleted { id })
                        .await;
                }
                Err(e) if e.kind() == RemoteErrorKind::NotFound => {
                    metrics::record_remote_error("delete", e.kind());
                    info!("Pingdom check {} for {} is already gone", id, key);
                }
                Err(e) => {
                    // The finalizer stays until Pingdom confirms the check is gone
                    metrics::record_remote_error("delete", e.kind());
                    warn!("Deleting Pingdom check {} for {} failed, will retry: {}", id, key, e);
                    return Err(Error::CleanupFailed(e));
                }
            },
        }

        let mut finalizers = FinalizerSet::from_slice(check.finalizers());
        if finalizers.remove(HTTP_CHECK_FINALIZER) {
            self.store.replace_finalizers(check, &finalizers).await?;
        }

        metrics::record_reconcile(ReconcileAction::Deleted);
        info!("Cleanup complete for HttpCheck {}", key);
        Ok(Action::await_change())
    }

    /// Create or update the Pingdom check and record the outcome
    async fn apply(&self, check: &HttpCheck) -> Result<Action> {
        let key = CheckKey::from_resource(check);

        let descriptor = match normalize(&check.spec.name, &check.spec.url) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                // Retrying cannot help until the spec changes
                warn!("Validation failed for {}: {}", key, e);
                let message = e.to_string();
                self.report(
                    check,
                    Outcome::Rejected {
                        message: message.clone(),
                    },
                )
                .await?;
                self.store
                    .publish_event(check, CheckEvent::InvalidSpec { message })
                    .await;
                metrics::record_reconcile(ReconcileAction::InvalidSpec);
                return Ok(Action::await_change());
            }
        };

        let mut stale: Option<(CheckId, RemoteErrorKind)> = None;
        if let Some(id) = check.pingdom_id() {
            match self.checks.update(id, &descriptor).await {
                Ok(()) => {
                    debug!("Pingdom check {} for {} is up to date", id, key);
                    self.report(check, Outcome::Synced { id }).await?;
                    metrics::record_reconcile(ReconcileAction::Updated);
                    return Ok(Action::await_change());
                }
                Err(e) if e.kind() == RemoteErrorKind::Transport => {
                    return Err(self.remote_failure("update", e));
                }
                Err(e) => {
                    metrics::record_remote_error("update", e.kind());
                    warn!(
                        "Updating Pingdom check {} for {} failed ({}), creating a new one",
                        id, key, e
                    );
                    stale = Some((id, e.kind()));
                }
            }
        }

        match self.checks.create(&descriptor).await {
            Ok(id) => {
                info!("Created Pingdom check {} for {}", id, key);
                self.report(check, Outcome::Synced { id }).await?;
                self.store
                    .publish_event(check, CheckEvent::Created { id })
                    .await;
                metrics::record_reconcile(if stale.is_some() {
                    ReconcileAction::Recreated
                } else {
                    ReconcileAction::Created
                });
                Ok(Action::await_change())
            }
            Err(e) if e.kind() == RemoteErrorKind::Transport => {
                Err(self.remote_failure("create", e))
            }
            Err(e) => {
                // Sending the identical request again would be refused again
                metrics::record_remote_error("create", e.kind());
                warn!("Pingdom refused check for {}: {}", key, e);

                let message = e.message().to_string();
                let outcome = match stale {
                    Some((_, RemoteErrorKind::NotFound)) => Outcome::Lost {
                        message: message.clone(),
                    },
                    _ => Outcome::Rejected {
                        message: message.clone(),
                    },
                };
                self.report(check, outcome).await?;
                self.store
                    .publish_event(check, CheckEvent::Rejected { message })
                    .await;
                metrics::record_reconcile(ReconcileAction::Rejected);
                Ok(Action::await_change())
            }
        }
    }

    /// Persist the status for `outcome` unless it is already recorded
    async fn report(&self, check: &HttpCheck, outcome: Outcome) -> Result<()> {
        let reported = status::report(check, outcome);
        if reported.status == check.status {
            debug!("Status of {} unchanged", CheckKey::from_resource(check));
            return Ok(());
        }
        self.store.replace_status(&reported).await
    }

    fn remote_failure(&self, operation: &str, error: RemoteError) -> Error {
        metrics::record_remote_error(operation, error.kind());
        warn!("Pingdom {} failed, will retry: {}", operation, error);
        Error::from(error)
    }
}
