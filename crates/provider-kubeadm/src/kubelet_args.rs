//! Regeneration of the kubelet `KUBELET_KUBEADM_ARGS` line.
//!
//! The reconfigure helper writes this line into `kubeadm-flags.env`, so it
//! has to match what `kubeadm` itself would produce for the node.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cluster::Role;
use crate::constants::{DEFAULT_CRI_SOCKET, KUBELET_ENV_FILE_VARIABLE};
use crate::kubeadm::{ClusterConfiguration, ExtraArgs, NodeRegistrationOptions, Schema, Taint};
use crate::version::KubeVersion;

/// Pause image tag shipped with a Kubernetes minor release.
///
/// Versions outside the table get an empty tag.
#[must_use]
pub fn pause_version(kubernetes_version: &str) -> &'static str {
    let Ok(version) = kubernetes_version.parse::<KubeVersion>() else {
        return "";
    };
    match (version.major, version.minor) {
        (1, 22 | 23) => "3.6",
        (1, 24) => "3.7",
        (1, 25) => "3.8",
        (1, 26..=30) => "3.9",
        _ => "",
    }
}

/// Build the kubelet flags line for a node.
///
/// `hostname` is the machine hostname; a `hostname-override` flag is only
/// added when the effective node name differs from it. User kubelet
/// extra-args take precedence over every computed flag.
#[must_use]
pub fn regenerate_kubelet_args<S: Schema>(
    cluster: &ClusterConfiguration<S>,
    node_registration: &NodeRegistrationOptions<S>,
    role: Role,
    hostname: &str,
) -> String {
    let mut flags = BTreeMap::new();

    let cri_socket = if node_registration.cri_socket.is_empty() {
        DEFAULT_CRI_SOCKET
    } else {
        node_registration.cri_socket.as_str()
    };
    flags.insert(
        "container-runtime-endpoint".to_string(),
        cri_socket.to_string(),
    );

    if S::EMITS_PAUSE_IMAGE {
        flags.insert(
            "pod-infra-container-image".to_string(),
            format!(
                "{}/pause:{}",
                cluster.image_repository,
                pause_version(&cluster.kubernetes_version)
            ),
        );
    }

    if role == Role::Worker {
        let taints = node_registration.taints.as_deref().unwrap_or_default();
        if !taints.is_empty() {
            let joined = taints
                .iter()
                .map(Taint::to_flag)
                .collect::<Vec<_>>()
                .join(",");
            flags.insert("register-with-taints".to_string(), joined);
        }
    }

    let extra_args = &node_registration.kubelet_extra_args;
    let node_name = if !node_registration.name.is_empty() {
        node_registration.name.as_str()
    } else {
        extra_args.get("hostname-override").unwrap_or(hostname)
    };
    if node_name != hostname {
        debug!("setting kubelet hostname-override to {node_name:?}");
        flags.insert("hostname-override".to_string(), node_name.to_string());
    }

    flags.extend(extra_args.to_map());

    let args = flags
        .iter()
        .map(|(name, value)| format!("--{name}={value}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!("{KUBELET_ENV_FILE_VARIABLE}=\"{}\"", escape_double_quoted(&args))
}

fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubeadm::{Arg, ArgList, ArgMap, V1Beta3, V1Beta4};

    fn cluster<S: Schema>(version: &str) -> ClusterConfiguration<S> {
        let mut cluster = ClusterConfiguration::<S>::default();
        cluster.image_repository = "registry.k8s.io".into();
        cluster.kubernetes_version = version.into();
        cluster
    }

    fn taint() -> Taint {
        Taint {
            key: "dedicated".into(),
            value: "gpu".into(),
            effect: "NoSchedule".into(),
            ..Taint::default()
        }
    }

    #[test]
    fn test_pause_table() {
        assert_eq!(pause_version("v1.22.4"), "3.6");
        assert_eq!(pause_version("v1.23.0"), "3.6");
        assert_eq!(pause_version("v1.24.1"), "3.7");
        assert_eq!(pause_version("v1.25.9"), "3.8");
        assert_eq!(pause_version("v1.26.0"), "3.9");
        assert_eq!(pause_version("1.30.11"), "3.9");
        assert_eq!(pause_version("v1.21.0"), "");
        assert_eq!(pause_version(""), "");
    }

    #[test]
    fn test_legacy_line() {
        let node = NodeRegistrationOptions::<V1Beta3>::default();
        let c = cluster::<V1Beta3>("v1.30.11");
        let line = regenerate_kubelet_args(&c, &node, Role::Init, "node-a");
        assert_eq!(
            line,
            "KUBELET_KUBEADM_ARGS=\"--container-runtime-endpoint=unix:///var/run/containerd/containerd.sock --pod-infra-container-image=registry.k8s.io/pause:3.9\""
        );
    }

    #[test]
    fn test_current_schema_omits_pause_image() {
        let node = NodeRegistrationOptions::<V1Beta4> {
            cri_socket: "unix:///run/k3s/containerd.sock".into(),
            ..NodeRegistrationOptions::default()
        };
        let c = cluster::<V1Beta4>("v1.31.2");
        let line = regenerate_kubelet_args(&c, &node, Role::Init, "node-a");
        assert_eq!(
            line,
            "KUBELET_KUBEADM_ARGS=\"--container-runtime-endpoint=unix:///run/k3s/containerd.sock\""
        );
    }

    #[test]
    fn test_taints_only_for_workers() {
        let node = NodeRegistrationOptions::<V1Beta4> {
            taints: Some(vec![taint()]),
            ..NodeRegistrationOptions::default()
        };
        let c = cluster::<V1Beta4>("");

        let worker = regenerate_kubelet_args(&c, &node, Role::Worker, "node-a");
        assert!(worker.contains("--register-with-taints=dedicated=gpu:NoSchedule"));

        let control_plane = regenerate_kubelet_args(&c, &node, Role::ControlPlane, "node-a");
        assert!(!control_plane.contains("register-with-taints"));
    }

    #[test]
    fn test_hostname_override() {
        let c = cluster::<V1Beta3>("v1.29.0");
        let named = NodeRegistrationOptions::<V1Beta3> {
            name: "edge-1".into(),
            ..NodeRegistrationOptions::default()
        };
        assert!(regenerate_kubelet_args(&c, &named, Role::Worker, "node-a")
            .contains("--hostname-override=edge-1"));
        assert!(!regenerate_kubelet_args(&c, &named, Role::Worker, "edge-1")
            .contains("hostname-override"));
    }

    #[test]
    fn test_user_args_win_and_sort() {
        let node = NodeRegistrationOptions::<V1Beta4> {
            kubelet_extra_args: ArgList(vec![
                Arg::new("node-ip", "10.0.0.5"),
                Arg::new("container-runtime-endpoint", "unix:///custom.sock"),
                Arg::new("authentication-token-webhook", "true"),
            ]),
            ..NodeRegistrationOptions::default()
        };
        let c = cluster::<V1Beta4>("");
        let line = regenerate_kubelet_args(&c, &node, Role::Init, "node-a");
        assert_eq!(
            line,
            "KUBELET_KUBEADM_ARGS=\"--authentication-token-webhook=true --container-runtime-endpoint=unix:///custom.sock --node-ip=10.0.0.5\""
        );
    }

    #[test]
    fn test_output_is_order_independent() {
        let forward = NodeRegistrationOptions::<V1Beta4> {
            kubelet_extra_args: ArgList(vec![Arg::new("node-ip", "10.0.0.5"), Arg::new("v", "2")]),
            ..NodeRegistrationOptions::default()
        };
        let reversed = NodeRegistrationOptions::<V1Beta4> {
            kubelet_extra_args: ArgList(vec![Arg::new("v", "2"), Arg::new("node-ip", "10.0.0.5")]),
            ..NodeRegistrationOptions::default()
        };
        let c = cluster::<V1Beta4>("");

        let a = regenerate_kubelet_args(&c, &forward, Role::Init, "n");
        let b = regenerate_kubelet_args(&c, &reversed, Role::Init, "n");
        assert_eq!(a, b);
        assert!(a.ends_with("--node-ip=10.0.0.5 --v=2\""));
    }

    #[test]
    fn test_quotes_are_escaped() {
        let mut args = ArgMap::default();
        args.0.insert("node-labels".into(), "a=\"b\"".into());
        let node = NodeRegistrationOptions::<V1Beta3> {
            kubelet_extra_args: args,
            ..NodeRegistrationOptions::default()
        };
        let c = cluster::<V1Beta3>("");
        let line = regenerate_kubelet_args(&c, &node, Role::Init, "n");
        assert!(line.contains(r#"--node-labels=a=\"b\""#));
    }
}
