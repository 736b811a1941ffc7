//! Access to HttpCheck resources in the cluster
//!
//! The reconciler only reads resources, rewrites their finalizers and status,
//! and publishes events. [`CheckStore`] captures exactly that, with
//! [`KubeCheckStore`] as the kube-rs backed implementation.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::{
    api::{Api, ObjectMeta, Patch, PatchParams, PostParams},
    Client, Resource, ResourceExt,
};
use tracing::{debug, warn};

use super::finalizers::FinalizerSet;
use crate::crd::HttpCheck;
use crate::error::{Error, Result};

/// Identity of an HttpCheck in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckKey {
    pub namespace: String,
    pub name: String,
}

impl CheckKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn from_resource(check: &HttpCheck) -> Self {
        Self::new(
            check.namespace().unwrap_or_else(|| "default".to_string()),
            check.name_any(),
        )
    }
}

impl std::fmt::Display for CheckKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Kubernetes events emitted for an HttpCheck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    Created { id: u64 },
    Deleted { id: u64 },
    InvalidSpec { message: String },
    Rejected { message: String },
}

impl CheckEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CheckEvent::Created { .. } | CheckEvent::Deleted { .. } => "Normal",
            CheckEvent::InvalidSpec { .. } | CheckEvent::Rejected { .. } => "Warning",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            CheckEvent::Created { .. } => "Created",
            CheckEvent::Deleted { .. } => "Deleted",
            CheckEvent::InvalidSpec { .. } => "InvalidSpec",
            CheckEvent::Rejected { .. } => "Rejected",
        }
    }

    pub fn message(&self) -> String {
        match self {
            CheckEvent::Created { id } => format!("Created Pingdom check {}", id),
            CheckEvent::Deleted { id } => format!("Deleted Pingdom check {}", id),
            CheckEvent::InvalidSpec { message } => format!("Invalid check spec: {}", message),
            CheckEvent::Rejected { message } => format!("Pingdom rejected the check: {}", message),
        }
    }
}

/// Read and persist the parts of an HttpCheck the reconciler owns
#[async_trait]
pub trait CheckStore: Send + Sync {
    /// Fetch the current state of the resource; `None` if it no longer exists
    async fn get(&self, key: &CheckKey) -> Result<Option<HttpCheck>>;

    /// Persist `finalizers` as the resource's finalizer list
    async fn replace_finalizers(&self, check: &HttpCheck, finalizers: &FinalizerSet)
        -> Result<()>;

    /// Persist the status carried by `check`
    async fn replace_status(&self, check: &HttpCheck) -> Result<()>;

    /// Publish an event for the resource; failures are not propagated
    async fn publish_event(&self, check: &HttpCheck, event: CheckEvent);
}

/// [`CheckStore`] backed by the Kubernetes API
pub struct KubeCheckStore {
    client: Client,
}

impl KubeCheckStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<HttpCheck> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl CheckStore for KubeCheckStore {
    async fn get(&self, key: &CheckKey) -> Result<Option<HttpCheck>> {
        self.api(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(Error::KubeError)
    }

    async fn replace_finalizers(
        &self,
        check: &HttpCheck,
        finalizers: &FinalizerSet,
    ) -> Result<()> {
        let key = CheckKey::from_resource(check);

        // resourceVersion turns the merge patch into a conflict-checked write
        let patch = serde_json::json!({
            "metadata": {
                "finalizers": finalizers.as_slice(),
                "resourceVersion": check.resource_version(),
            }
        });

        self.api(&key.namespace)
            .patch(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(Error::KubeError)?;

        debug!("Finalizers of {} set to {:?}", key, finalizers.as_slice());
        Ok(())
    }

    async fn replace_status(&self, check: &HttpCheck) -> Result<()> {
        let key = CheckKey::from_resource(check);
        let patch = serde_json::json!({ "status": check.status });

        self.api(&key.namespace)
            .patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(Error::KubeError)?;

        Ok(())
    }

    async fn publish_event(&self, check: &HttpCheck, event: CheckEvent) {
        let key = CheckKey::from_resource(check);
        let events: Api<Event> = Api::namespaced(self.client.clone(), &key.namespace);

        let time = chrono::Utc::now();
        let record = Event {
            metadata: ObjectMeta {
                generate_name: Some(format!("{}-", key.name)),
                ..Default::default()
            },
            type_: Some(event.event_type().to_string()),
            reason: Some(event.reason().to_string()),
            message: Some(event.message()),
            involved_object: check.object_ref(&()),
            first_timestamp: Some(Time(time)),
            last_timestamp: Some(Time(time)),
            count: Some(1),
            reporting_component: Some("pingdom-operator".to_string()),
            ..Default::default()
        };

        if let Err(e) = events.create(&PostParams::default(), &record).await {
            warn!("Failed to publish {} event for {}: {:?}", event.reason(), key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_classification() {
        let created = CheckEvent::Created { id: 12 };
        assert_eq!(created.event_type(), "Normal");
        assert_eq!(created.reason(), "Created");
        assert_eq!(created.message(), "Created Pingdom check 12");

        let rejected = CheckEvent::Rejected {
            message: "Check limit reached".to_string(),
        };
        assert_eq!(rejected.event_type(), "Warning");
        assert_eq!(
            rejected.message(),
            "Pingdom rejected the check: Check limit reached"
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(CheckKey::new("shop", "storefront").to_string(), "shop/storefront");
    }
}
