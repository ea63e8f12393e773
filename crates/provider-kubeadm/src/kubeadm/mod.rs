//! Kubeadm and kubelet configuration objects.
//!
//! The two kubeadm API generations differ only in the shape of extra-args
//! (string map in v1beta3, ordered `{name, value}` list in v1beta4) and in
//! their group/version tag. Objects are generic over a [`Schema`] marker so
//! the rest of the crate is written once.

mod args;
mod config;
mod kubelet;
pub mod scheme;
mod types;

use std::fmt::Debug;

pub use args::{Arg, ArgList, ArgMap, ExtraArgs};
pub use config::{Config, KubeadmConfig};
pub use kubelet::{
    KubeletAnonymousAuthentication, KubeletAuthentication, KubeletAuthorization,
    KubeletConfiguration, KubeletWebhookAuthentication, KubeletX509Authentication,
};
pub use scheme::{GroupVersionKind, Scheme, YamlPrinter, SCHEME};
pub use types::{
    ApiEndpoint, ApiServer, BootstrapToken, BootstrapTokenDiscovery, ClusterConfiguration,
    Discovery, InitConfiguration, JoinConfiguration, JoinControlPlane, Networking,
    NodeRegistrationOptions, Taint,
};

/// Kubelet configuration API group/version (shared by both schemas).
pub const KUBELET_API_VERSION: &str = "kubelet.config.k8s.io/v1beta1";

/// Compile-time description of one kubeadm API generation.
pub trait Schema: Debug + Clone + Default + PartialEq + Send + Sync + 'static {
    /// Extra-args representation for this generation.
    type Args: ExtraArgs;

    /// `apiVersion` of kubeadm objects.
    const API_VERSION: &'static str;

    /// Whether the kubelet flags carry `--pod-infra-container-image`.
    const EMITS_PAUSE_IMAGE: bool;
}

/// `kubeadm.k8s.io/v1beta3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct V1Beta3;

impl Schema for V1Beta3 {
    type Args = ArgMap;
    const API_VERSION: &'static str = "kubeadm.k8s.io/v1beta3";
    const EMITS_PAUSE_IMAGE: bool = true;
}

/// `kubeadm.k8s.io/v1beta4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct V1Beta4;

impl Schema for V1Beta4 {
    type Args = ArgList;
    const API_VERSION: &'static str = "kubeadm.k8s.io/v1beta4";
    const EMITS_PAUSE_IMAGE: bool = false;
}
