//! `KubeletConfiguration` (`kubelet.config.k8s.io/v1beta1`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::Extra;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Kubelet component configuration.
///
/// Durations are kept in their Go string form (`2m0s`, `90s`) and written
/// back as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubeletConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_gates: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub static_pod_path: String,
    #[serde(rename = "clusterDNS", skip_serializing_if = "Option::is_none")]
    pub cluster_dns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_domain: String,
    #[serde(skip_serializing_if = "KubeletAuthentication::is_empty")]
    pub authentication: KubeletAuthentication,
    #[serde(skip_serializing_if = "KubeletAuthorization::is_empty")]
    pub authorization: KubeletAuthorization,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub healthz_bind_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthz_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_grace_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_grace_period_critical_pods: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub rotate_certificates: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cgroup_driver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolv_conf: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeletAuthentication {
    pub x509: KubeletX509Authentication,
    pub webhook: KubeletWebhookAuthentication,
    pub anonymous: KubeletAnonymousAuthentication,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KubeletAuthentication {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeletX509Authentication {
    #[serde(rename = "clientCAFile", skip_serializing_if = "String::is_empty")]
    pub client_ca_file: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubeletWebhookAuthentication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeletAnonymousAuthentication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeletAuthorization {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl KubeletAuthorization {
    fn is_empty(&self) -> bool {
        self.mode.is_empty() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_names() {
        let cfg: KubeletConfiguration = serde_json::from_value(json!({
            "clusterDNS": ["10.43.0.10"],
            "authentication": {"x509": {"clientCAFile": "/ca.crt"}, "webhook": {"cacheTTL": "2m"}},
            "shutdownGracePeriod": "30s",
            "maxPods": 250,
        }))
        .unwrap();

        assert_eq!(cfg.cluster_dns, Some(vec!["10.43.0.10".to_string()]));
        assert_eq!(cfg.authentication.x509.client_ca_file, "/ca.crt");
        assert_eq!(cfg.shutdown_grace_period.as_deref(), Some("30s"));
        assert_eq!(cfg.extra["maxPods"], json!(250));

        let back = serde_json::to_value(&cfg).unwrap();
        assert_eq!(back["authentication"]["webhook"]["cacheTTL"], "2m");
        assert!(back.get("rotateCertificates").is_none());
        assert!(back.get("authorization").is_none());
    }

    #[test]
    fn test_x509_keeps_unknown_fields() {
        let cfg: KubeletConfiguration = serde_json::from_value(json!({
            "authentication": {"x509": {"clientCAFile": "/ca.crt", "clientCAData": "LS0t"}},
        }))
        .unwrap();

        assert_eq!(cfg.authentication.x509.extra["clientCAData"], "LS0t");

        let back = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            back["authentication"]["x509"],
            json!({"clientCAFile": "/ca.crt", "clientCAData": "LS0t"})
        );
    }
}
