//! Proxy environment for the kubelet and the container runtime.

use std::collections::BTreeMap;

use crate::constants::{
    CONTAINERD_PROXY_DROPIN, K8S_NO_PROXY, KUBELET_ENV_DIR, RUN_SYSTEMD_SYSTEM_DIR,
};
use crate::context::ClusterContext;

pub const HTTP_PROXY: &str = "HTTP_PROXY";
pub const HTTPS_PROXY: &str = "HTTPS_PROXY";
pub const NO_PROXY: &str = "NO_PROXY";

/// Whether an HTTP or HTTPS proxy is set. `NO_PROXY` alone does not count.
#[must_use]
pub fn is_proxy_configured(env: &BTreeMap<String, String>) -> bool {
    [HTTP_PROXY, HTTPS_PROXY]
        .iter()
        .any(|key| env.get(*key).is_some_and(|v| !v.is_empty()))
}

/// Cluster-internal destinations that must bypass the proxy.
#[must_use]
pub fn default_no_proxy(cluster_cidr: &str, service_cidr: &str) -> String {
    [cluster_cidr, service_cidr, K8S_NO_PROXY]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Effective `NO_PROXY`: the cluster defaults followed by the user's list.
#[must_use]
pub fn no_proxy(ctx: &ClusterContext) -> String {
    let defaults = default_no_proxy(&ctx.cluster_cidr, &ctx.service_cidr);
    match ctx.env(NO_PROXY) {
        "" => defaults,
        user => format!("{defaults},{user}"),
    }
}

/// `HTTP_PROXY`, `HTTPS_PROXY` and `NO_PROXY` values for helper scripts,
/// or `None` when no proxy is configured.
#[must_use]
pub fn proxy_args(ctx: &ClusterContext) -> Option<[String; 3]> {
    is_proxy_configured(&ctx.env_config).then(|| {
        [
            ctx.env(HTTP_PROXY).to_string(),
            ctx.env(HTTPS_PROXY).to_string(),
            no_proxy(ctx),
        ]
    })
}

/// Path of the kubelet environment file.
#[must_use]
pub fn kubelet_env_path() -> String {
    format!("{KUBELET_ENV_DIR}/kubelet")
}

/// Path of the container runtime proxy drop-in.
#[must_use]
pub fn containerd_dropin_path(ctx: &ClusterContext) -> String {
    format!(
        "{RUN_SYSTEMD_SYSTEM_DIR}/{}.service.d/{CONTAINERD_PROXY_DROPIN}",
        ctx.containerd_service_folder_name
    )
}

fn proxy_lines(ctx: &ClusterContext) -> Vec<(&'static str, String)> {
    let Some([http, https, no_proxy]) = proxy_args(ctx) else {
        return Vec::new();
    };

    let mut lines = Vec::with_capacity(3);
    if !http.is_empty() {
        lines.push((HTTP_PROXY, http));
    }
    if !https.is_empty() {
        lines.push((HTTPS_PROXY, https));
    }
    lines.push((NO_PROXY, no_proxy));
    lines
}

/// `KEY=VALUE` lines for `/etc/default/kubelet`; empty without a proxy.
#[must_use]
pub fn kubelet_proxy_env(ctx: &ClusterContext) -> String {
    proxy_lines(ctx)
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// systemd drop-in setting the proxy for the runtime; empty without a proxy.
#[must_use]
pub fn containerd_proxy_env(ctx: &ClusterContext) -> String {
    let lines = proxy_lines(ctx);
    if lines.is_empty() {
        return String::new();
    }

    std::iter::once("[Service]".to_string())
        .chain(
            lines
                .into_iter()
                .map(|(key, value)| format!("Environment=\"{key}={value}\"")),
        )
        .collect::<Vec<_>>()
        .join("\n")
}
