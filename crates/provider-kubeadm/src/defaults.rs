//! Required defaults for cluster and kubelet configuration.
//!
//! Both mutators are idempotent: applying them twice gives the same result
//! as applying them once.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

use crate::constants::{
    API_SERVER_PORT, DEFAULT_CLUSTER_DNS_IP, DEFAULT_IMAGE_REPOSITORY, DEFAULT_MANIFESTS_DIR,
    DEFAULT_SERVICE_DNS_DOMAIN, KUBELET_HEALTHZ_PORT, KUBERNETES_DIR,
    SYSTEMD_RESOLVED_RESOLV_CONF,
};
use crate::kubeadm::{ClusterConfiguration, KubeletConfiguration, Schema};

/// Default kubelet shutdown grace period (120s).
pub const SHUTDOWN_GRACE_PERIOD: &str = "2m0s";

/// Default grace period reserved for critical pods (60s).
pub const SHUTDOWN_GRACE_PERIOD_CRITICAL_PODS: &str = "1m0s";

/// Offset of the cluster DNS service inside the service subnet.
const DNS_IP_INDEX: u32 = 10;

/// Point the cluster at the control-plane host.
///
/// Adds the host to the API server cert-SANs (once), pins
/// `controlPlaneEndpoint` to `host:6443` and fills the image repository.
pub fn mutate_cluster_defaults<S: Schema>(
    cluster: &mut ClusterConfiguration<S>,
    control_plane_host: &str,
) {
    let sans = &mut cluster.api_server.cert_sans;
    if !sans.iter().any(|san| san == control_plane_host) {
        sans.push(control_plane_host.to_string());
    }

    cluster.control_plane_endpoint = format!("{control_plane_host}:{API_SERVER_PORT}");

    if cluster.image_repository.is_empty() {
        cluster.image_repository = DEFAULT_IMAGE_REPOSITORY.to_string();
    }
}

/// Fill unset kubelet fields the way `kubeadm` would.
///
/// `resolved_active` tells whether `systemd-resolved` runs on the node; if
/// so the kubelet is pointed at its upstream resolver file.
pub fn mutate_kubelet_defaults(
    kubelet: &mut KubeletConfiguration,
    service_subnet: &str,
    resolved_active: bool,
) {
    kubelet.feature_gates.get_or_insert_with(BTreeMap::new);

    if kubelet.static_pod_path.is_empty() {
        kubelet.static_pod_path = DEFAULT_MANIFESTS_DIR.to_string();
    }

    kubelet
        .cluster_dns
        .get_or_insert_with(|| vec![cluster_dns_ip(service_subnet)]);

    if kubelet.cluster_domain.is_empty() {
        kubelet.cluster_domain = DEFAULT_SERVICE_DNS_DOMAIN.to_string();
    }

    let auth = &mut kubelet.authentication;
    if auth.x509.client_ca_file.is_empty() {
        auth.x509.client_ca_file = format!("{KUBERNETES_DIR}/pki/ca.crt");
    }
    auth.anonymous.enabled.get_or_insert(false);
    auth.webhook.enabled.get_or_insert(true);

    if kubelet.authorization.mode.is_empty() {
        kubelet.authorization.mode = "Webhook".to_string();
    }

    if kubelet.healthz_bind_address.is_empty() {
        kubelet.healthz_bind_address = "127.0.0.1".to_string();
    }
    kubelet.healthz_port.get_or_insert(KUBELET_HEALTHZ_PORT);

    if is_zero_duration(kubelet.shutdown_grace_period.as_deref()) {
        kubelet.shutdown_grace_period = Some(SHUTDOWN_GRACE_PERIOD.to_string());
    }
    if is_zero_duration(kubelet.shutdown_grace_period_critical_pods.as_deref()) {
        kubelet.shutdown_grace_period_critical_pods =
            Some(SHUTDOWN_GRACE_PERIOD_CRITICAL_PODS.to_string());
    }

    kubelet.rotate_certificates = true;

    if kubelet.cgroup_driver.is_empty() {
        kubelet.cgroup_driver = "systemd".to_string();
    }

    if resolved_active && kubelet.resolv_conf.is_none() {
        kubelet.resolv_conf = Some(SYSTEMD_RESOLVED_RESOLV_CONF.to_string());
    }
}

/// Whether a Go duration string is unset or zero (`""`, `0`, `0s`, `0m0s`).
fn is_zero_duration(duration: Option<&str>) -> bool {
    !duration.is_some_and(|d| d.chars().any(|c| c.is_ascii_digit() && c != '0'))
}

/// Cluster DNS address: the 10th address of the first service subnet.
///
/// Falls back to `10.96.0.10` when the subnet is missing, malformed or too
/// small.
#[must_use]
pub fn cluster_dns_ip(service_subnet: &str) -> String {
    let first = service_subnet.split(',').next().unwrap_or_default().trim();
    indexed_ip(first, DNS_IP_INDEX)
        .map_or_else(|| DEFAULT_CLUSTER_DNS_IP.to_string(), |ip| ip.to_string())
}

fn indexed_ip(cidr: &str, index: u32) -> Option<IpAddr> {
    let net = cidr.parse::<IpNet>().ok()?;
    let ip = match net.network() {
        IpAddr::V4(base) => IpAddr::V4(Ipv4Addr::from(u32::from(base).checked_add(index)?)),
        IpAddr::V6(base) => {
            IpAddr::V6(Ipv6Addr::from(u128::from(base).checked_add(u128::from(index))?))
        }
    };
    net.contains(&ip).then_some(ip)
}
