//! Cluster input as supplied by the host orchestrator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role this node plays in the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// First control-plane node; runs `kubeadm init`.
    Init,
    /// Additional control-plane member; joins with control-plane certs.
    #[serde(rename = "controlplane")]
    ControlPlane,
    /// Worker node; plain join.
    Worker,
    /// No role assigned. Only the pre-stages are emitted.
    #[default]
    None,
}

impl Role {
    /// Wire name of the role, as passed to the helper scripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ControlPlane => "controlplane",
            Self::Worker => "worker",
            Self::None => "none",
        }
    }

    /// Whether this role joins an existing cluster.
    #[must_use]
    pub const fn is_join(self) -> bool {
        matches!(self, Self::ControlPlane | Self::Worker)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of this node's place in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    /// Shared cluster secret; transformed into a bootstrap token.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_token: String,
    /// Host (IP or DNS name) of the control-plane endpoint.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub control_plane_host: String,
    /// Node role.
    pub role: Role,
    /// User-supplied kubeadm configuration (YAML text).
    #[serde(rename = "config", skip_serializing_if = "String::is_empty")]
    pub options: String,
    /// Environment variables (proxy settings).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Host-supplied provider options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub provider_options: BTreeMap<String, String>,
    /// Directory holding locally bundled images.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub local_images_path: String,
    /// Whether to import the local image bundle.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub import_local_images: bool,
}

/// Host configuration document wrapping the cluster block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster section; absent when the node is not part of a cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Cluster>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::Init.to_string(), "init");
        assert_eq!(Role::ControlPlane.to_string(), "controlplane");
        assert_eq!(Role::Worker.to_string(), "worker");
        assert!(Role::Worker.is_join());
        assert!(!Role::Init.is_join());
    }

    #[test]
    fn test_cluster_config_from_yaml() {
        let yaml = r#"
cluster:
  cluster_token: abcdef.1234567890123456
  control_plane_host: 10.0.0.1
  role: controlplane
  config: |
    clusterConfiguration:
      kubernetesVersion: v1.30.11
  env:
    HTTP_PROXY: http://p:8080
  provider_options:
    cluster_root_path: /persistent/spectro
  import_local_images: true
"#;
        let config: ClusterConfig = serde_yaml::from_str(yaml).unwrap();
        let cluster = config.cluster.unwrap();

        assert_eq!(cluster.role, Role::ControlPlane);
        assert_eq!(cluster.control_plane_host, "10.0.0.1");
        assert!(cluster.options.contains("kubernetesVersion"));
        assert_eq!(cluster.env["HTTP_PROXY"], "http://p:8080");
        assert_eq!(
            cluster.provider_options["cluster_root_path"],
            "/persistent/spectro"
        );
        assert!(cluster.import_local_images);
        assert!(cluster.local_images_path.is_empty());
    }

    #[test]
    fn test_missing_cluster_block() {
        let config: ClusterConfig = serde_yaml::from_str("install:\n  device: auto\n").unwrap();
        assert!(config.cluster.is_none());
    }
}
