//! Kubeadm cluster/init/join configuration objects.
//!
//! Only the fields the provider reads or writes are typed. Everything else
//! lands in `extra` and is written back untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExtraArgs, Schema};

/// Passthrough for fields the provider does not model.
pub type Extra = BTreeMap<String, Value>;

fn is_zero(port: &i32) -> bool {
    *port == 0
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Cluster-wide settings (`ClusterConfiguration`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", bound = "")]
pub struct ClusterConfiguration<S: Schema> {
    #[serde(skip_serializing_if = "Networking::is_empty")]
    pub networking: Networking,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kubernetes_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub control_plane_endpoint: String,
    #[serde(skip_serializing_if = "ApiServer::is_empty")]
    pub api_server: ApiServer,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_repository: String,
    #[serde(flatten)]
    pub extra: Extra,
    #[serde(skip)]
    _schema: std::marker::PhantomData<S>,
}

/// Pod/service networking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Networking {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_subnet: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pod_subnet: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dns_domain: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Networking {
    fn is_empty(&self) -> bool {
        self.service_subnet.is_empty()
            && self.pod_subnet.is_empty()
            && self.dns_domain.is_empty()
            && self.extra.is_empty()
    }
}

/// API server settings. Extra-args stay in `extra` and are passed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiServer {
    #[serde(rename = "certSANs", skip_serializing_if = "Vec::is_empty")]
    pub cert_sans: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ApiServer {
    fn is_empty(&self) -> bool {
        self.cert_sans.is_empty() && self.extra.is_empty()
    }
}

/// Node-local settings for `kubeadm init` (`InitConfiguration`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", bound = "")]
pub struct InitConfiguration<S: Schema> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bootstrap_tokens: Vec<BootstrapToken>,
    pub node_registration: NodeRegistrationOptions<S>,
    #[serde(rename = "localAPIEndpoint")]
    pub local_api_endpoint: ApiEndpoint,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub certificate_key: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A bootstrap token entry of an init configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapToken {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Node registration options shared by init and join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", bound = "")]
pub struct NodeRegistrationOptions<S: Schema> {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cri_socket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taints: Option<Vec<Taint>>,
    #[serde(skip_serializing_if = "ExtraArgs::is_empty")]
    pub kubelet_extra_args: S::Args,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A node taint (`key=value:Effect`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taint {
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    pub effect: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Taint {
    /// Kubelet flag form: `key=value:effect`, or `key:effect` without a value.
    #[must_use]
    pub fn to_flag(&self) -> String {
        if self.value.is_empty() {
            format!("{}:{}", self.key, self.effect)
        } else {
            format!("{}={}:{}", self.key, self.value, self.effect)
        }
    }
}

/// Address/port an API server instance listens on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiEndpoint {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub advertise_address: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub bind_port: i32,
}

/// Settings for `kubeadm join` (`JoinConfiguration`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", bound = "")]
pub struct JoinConfiguration<S: Schema> {
    pub node_registration: NodeRegistrationOptions<S>,
    pub discovery: Discovery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<JoinControlPlane>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// How a joining node finds and trusts the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Discovery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_token: Option<BootstrapTokenDiscovery>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Token-based discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootstrapTokenDiscovery {
    pub token: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_server_endpoint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ca_cert_hashes: Vec<String>,
    #[serde(
        rename = "unsafeSkipCAVerification",
        skip_serializing_if = "is_false"
    )]
    pub unsafe_skip_ca_verification: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Extra settings for a control-plane join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinControlPlane {
    #[serde(rename = "localAPIEndpoint")]
    pub local_api_endpoint: ApiEndpoint,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub certificate_key: String,
    #[serde(flatten)]
    pub extra: Extra,
}
