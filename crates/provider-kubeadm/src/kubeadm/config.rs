//! Parsing of the user-supplied kubeadm options into a configuration set.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    ClusterConfiguration, InitConfiguration, JoinConfiguration, KubeletConfiguration, Schema,
    V1Beta3, V1Beta4,
};
use crate::version::ApiSchema;

/// The four configuration objects of one kubeadm API generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KubeadmConfig<S: Schema> {
    pub cluster: ClusterConfiguration<S>,
    pub init: InitConfiguration<S>,
    pub join: JoinConfiguration<S>,
    pub kubelet: KubeletConfiguration,
}

impl<S: Schema> KubeadmConfig<S> {
    /// Parse the `Options` YAML of a cluster.
    ///
    /// Best effort: unparseable YAML yields defaults, and each section
    /// falls back to its default on its own.
    #[must_use]
    pub fn from_options(options: &str) -> Self {
        if options.trim().is_empty() {
            return Self::default();
        }

        let root: Value = match serde_yaml::from_str(options) {
            Ok(value) => value,
            Err(e) => {
                debug!("ignoring unparseable cluster options: {e}");
                return Self::default();
            }
        };

        Self {
            cluster: section(&root, "clusterConfiguration"),
            init: section(&root, "initConfiguration"),
            join: section(&root, "joinConfiguration"),
            kubelet: section(&root, "kubeletConfiguration"),
        }
    }
}

fn section<T: DeserializeOwned + Default>(root: &Value, key: &str) -> T {
    match root.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("ignoring malformed {key}: {e}");
            T::default()
        }),
    }
}

/// A configuration set tagged with its API generation.
#[derive(Debug, Clone, PartialEq)]
pub enum Config {
    /// `kubeadm.k8s.io/v1beta3` (kubeadm < 1.31).
    Legacy(KubeadmConfig<V1Beta3>),
    /// `kubeadm.k8s.io/v1beta4` (kubeadm >= 1.31).
    Current(KubeadmConfig<V1Beta4>),
}

impl Config {
    /// Parse `options` into the generation selected by `schema`.
    #[must_use]
    pub fn parse(schema: ApiSchema, options: &str) -> Self {
        match schema {
            ApiSchema::Legacy => Self::Legacy(KubeadmConfig::from_options(options)),
            ApiSchema::Current => Self::Current(KubeadmConfig::from_options(options)),
        }
    }

    #[must_use]
    pub const fn schema(&self) -> ApiSchema {
        match self {
            Self::Legacy(_) => ApiSchema::Legacy,
            Self::Current(_) => ApiSchema::Current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubeadm::ExtraArgs;

    const OPTIONS: &str = r"
clusterConfiguration:
  kubernetesVersion: v1.30.11
  networking:
    podSubnet: 192.168.0.0/16
    serviceSubnet: 192.169.0.0/16
initConfiguration:
  nodeRegistration:
    kubeletExtraArgs:
      node-ip: 10.0.0.5
joinConfiguration:
  discovery: not-a-map
kubeletConfiguration:
  cgroupDriver: cgroupfs
";

    #[test]
    fn test_sections_parse_independently() {
        let cfg = KubeadmConfig::<V1Beta3>::from_options(OPTIONS);
        assert_eq!(cfg.cluster.kubernetes_version, "v1.30.11");
        assert_eq!(cfg.cluster.networking.service_subnet, "192.169.0.0/16");
        assert_eq!(
            cfg.init.node_registration.kubelet_extra_args.get("node-ip"),
            Some("10.0.0.5")
        );
        assert_eq!(cfg.join, JoinConfiguration::default());
        assert_eq!(cfg.kubelet.cgroup_driver, "cgroupfs");
    }

    #[test]
    fn test_invalid_yaml_yields_defaults() {
        let cfg = KubeadmConfig::<V1Beta4>::from_options("clusterConfiguration: [unterminated");
        assert_eq!(cfg, KubeadmConfig::default());
        assert_eq!(KubeadmConfig::<V1Beta4>::from_options(""), KubeadmConfig::default());
    }

    #[test]
    fn test_parse_selects_generation() {
        assert_eq!(Config::parse(ApiSchema::Legacy, OPTIONS).schema(), ApiSchema::Legacy);
        match Config::parse(ApiSchema::Current, OPTIONS) {
            Config::Current(cfg) => assert_eq!(
                cfg.init.node_registration.kubelet_extra_args.get("node-ip"),
                Some("10.0.0.5")
            ),
            Config::Legacy(_) => panic!("expected v1beta4"),
        }
    }
}
