//! Unit tests for the HttpCheck resource definition
//!
//! Covers the generated CRD metadata and the wire format of the status
//! subresource, which the reconciler relies on when merge-patching.

mod http_check_crd {
    use kube::CustomResourceExt;

    use crate::crd::HttpCheck;

    #[test]
    fn test_crd_identity() {
        let crd = HttpCheck::crd();
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some("httpchecks.pingdom.fbsb.io")
        );
        assert_eq!(crd.spec.group, "pingdom.fbsb.io");
        assert_eq!(crd.spec.names.kind, "HttpCheck");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(
            crd.spec.names.short_names,
            Some(vec!["hc".to_string()])
        );
    }

    #[test]
    fn test_crd_has_status_subresource_and_columns() {
        let crd = HttpCheck::crd();
        let version = &crd.spec.versions[0];
        assert_eq!(version.name, "v1alpha1");
        assert!(version
            .subresources
            .as_ref()
            .and_then(|s| s.status.as_ref())
            .is_some());

        let columns: Vec<_> = version
            .additional_printer_columns
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(columns, vec!["Check", "URL", "Pingdom ID", "Status", "Age"]);
    }
}

mod http_check_status {
    use serde_json::json;

    use crate::crd::{CheckState, HttpCheck, HttpCheckSpec, HttpCheckStatus};

    #[test]
    fn test_status_serializes_absent_fields_as_null() {
        let status = HttpCheckStatus {
            pingdom_id: Some(12),
            pingdom_status: Some(CheckState::Succeeded),
            error: None,
            observed_generation: Some(3),
        };

        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "pingdomId": 12,
                "pingdomStatus": "Succeeded",
                "error": null,
                "observedGeneration": 3
            })
        );
    }

    #[test]
    fn test_status_deserializes_from_partial_object() {
        let status: HttpCheckStatus =
            serde_json::from_value(json!({"pingdomStatus": "Failed", "error": "the port is invalid"}))
                .unwrap();

        assert!(status.is_failed());
        assert!(!status.is_succeeded());
        assert_eq!(status.pingdom_id, None);
        assert_eq!(status.error.as_deref(), Some("the port is invalid"));
    }

    #[test]
    fn test_resource_roundtrip_from_manifest() {
        let check: HttpCheck = serde_json::from_value(json!({
            "apiVersion": "pingdom.fbsb.io/v1alpha1",
            "kind": "HttpCheck",
            "metadata": {"name": "storefront", "namespace": "shop"},
            "spec": {"name": "Storefront", "url": "shop.example.com/healthz"}
        }))
        .unwrap();

        assert_eq!(
            check.spec,
            HttpCheckSpec {
                name: "Storefront".to_string(),
                url: "shop.example.com/healthz".to_string(),
            }
        );
        assert_eq!(check.pingdom_id(), None);
        assert!(!check.is_deleting());
    }
}
