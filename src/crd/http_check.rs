//! HttpCheck Custom Resource Definition
//!
//! The HttpCheck CRD declares a Pingdom HTTP uptime check. The operator keeps
//! exactly one Pingdom check per resource and reports the outcome in the
//! status subresource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::CheckState;
use crate::pingdom::CheckId;

/// The HttpCheck CRD represents a Pingdom HTTP check.
///
/// # Example
///
/// ```yaml
/// apiVersion: pingdom.fbsb.io/v1alpha1
/// kind: HttpCheck
/// metadata:
///   name: storefront
///   namespace: shop
/// spec:
///   name: "Storefront health"
///   url: "https://shop.example.com/healthz"
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "pingdom.fbsb.io",
    version = "v1alpha1",
    kind = "HttpCheck",
    namespaced,
    status = "HttpCheckStatus",
    shortname = "hc",
    printcolumn = r#"{"name":"Check","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"URL","type":"string","jsonPath":".spec.url"}"#,
    printcolumn = r#"{"name":"Pingdom ID","type":"integer","jsonPath":".status.pingdomId"}"#,
    printcolumn = r#"{"name":"Status","type":"string","jsonPath":".status.pingdomStatus"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HttpCheckSpec {
    /// Name of the check as shown in Pingdom
    pub name: String,

    /// Address to check, e.g. `example.com`, `https://user:pw@example.com:8443/health?full=1`.
    /// Defaults to plain HTTP when no scheme is given.
    pub url: String,
}

/// Status subresource for HttpCheck
///
/// Absent values serialize as `null` so a merge patch of the status clears
/// whatever a previous reconciliation wrote.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpCheckStatus {
    /// Id of the Pingdom check managed for this resource
    #[serde(default)]
    pub pingdom_id: Option<CheckId>,

    /// Result of the last reconciliation
    #[serde(default)]
    pub pingdom_status: Option<CheckState>,

    /// Why the last reconciliation failed
    #[serde(default)]
    pub error: Option<String>,

    /// Generation of the spec the status was computed from
    #[serde(default)]
    pub observed_generation: Option<i64>,
}

impl HttpCheckStatus {
    pub fn is_succeeded(&self) -> bool {
        self.pingdom_status == Some(CheckState::Succeeded)
    }

    pub fn is_failed(&self) -> bool {
        self.pingdom_status == Some(CheckState::Failed)
    }
}

impl HttpCheck {
    /// Pingdom id recorded in the status, if any
    pub fn pingdom_id(&self) -> Option<CheckId> {
        self.status.as_ref().and_then(|s| s.pingdom_id)
    }

    /// Whether the owner asked for the resource to be removed
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }
}
