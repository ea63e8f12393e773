//! Fixed paths, ports and defaults shared across the provider.

/// Name of the emitted plan document.
pub const PLAN_NAME: &str = "Kubeadm Kairos Cluster Provider";

/// The single boot phase the plan populates.
pub const BOOT_BEFORE: &str = "boot.before";

/// Provider option holding the cluster root path.
pub const CLUSTER_ROOT_PATH_OPTION: &str = "cluster_root_path";

/// Provider option selecting the vendor container runtime unit.
pub const SPECTRO_CONTAINERD_OPTION: &str = "spectro-containerd-service-name";

/// Standard container runtime service folder.
pub const CONTAINERD_SERVICE: &str = "containerd";

/// Vendor container runtime service folder.
pub const SPECTRO_CONTAINERD_SERVICE: &str = "spectro-containerd";

/// Root path used when none is supplied (appliance mode).
pub const DEFAULT_ROOT_PATH: &str = "/";

/// Local image bundle location, relative to the root path.
pub const LOCAL_IMAGES_DIR: &str = "opt/content/images";

/// Core Kubernetes image bundle location, relative to the root path.
pub const KUBE_IMAGES_DIR: &str = "opt/kube-images";

/// Helper scripts location, relative to the root path.
pub const HELPER_SCRIPT_DIR: &str = "opt/kubeadm/scripts";

/// Generated kubeadm configuration location, relative to the root path.
pub const CONFIGURATION_DIR: &str = "opt/kubeadm";

/// Sentinel written after `kubeadm init` succeeds.
pub const KUBEADM_INIT_SENTINEL: &str = "opt/kubeadm.init";

/// Sentinel written after `kubeadm join` succeeds.
pub const KUBEADM_JOIN_SENTINEL: &str = "opt/kubeadm.join";

/// Sentinel written after the post-init helper succeeds.
pub const POST_KUBEADM_INIT_SENTINEL: &str = "opt/post-kubeadm.init";

/// Kubelet environment file directory.
pub const KUBELET_ENV_DIR: &str = "/etc/default";

/// Runtime systemd unit directory used for drop-ins.
pub const RUN_SYSTEMD_SYSTEM_DIR: &str = "/run/systemd/system";

/// Units a bind mount of the cluster root must come up before.
pub const KUBERNETES_SERVICES: &str =
    "spectro-containerd.service containerd.service kubelet.service";

/// Directories bind-mounted from an agent cluster root onto `/`.
pub const ROOT_MOUNT_DIRS: [&str; 7] = [
    "opt/bin",
    "opt/cni/bin",
    "etc/cni/net.d",
    "var/lib/spectro/containerd",
    "etc/default/kubelet",
    "etc/kubernetes",
    "var/lib/kubelet",
];

/// Container runtime proxy drop-in file name.
pub const CONTAINERD_PROXY_DROPIN: &str = "http-proxy.conf";

/// Fixed service suffixes always present in `NO_PROXY`.
pub const K8S_NO_PROXY: &str = ".svc,.svc.cluster,.svc.cluster.local";

/// API server port used for the control-plane endpoint.
pub const API_SERVER_PORT: u16 = 6443;

/// Default advertise address for local API endpoints.
pub const DEFAULT_API_ADVERTISE_ADDRESS: &str = "0.0.0.0";

/// Schema boundary: kubeadm at or above this version speaks v1beta4.
pub const SCHEMA_BOUNDARY: &str = "v1.31.0";

/// Default image repository for control-plane images.
pub const DEFAULT_IMAGE_REPOSITORY: &str = "registry.k8s.io";

/// Static pod manifest directory.
pub const DEFAULT_MANIFESTS_DIR: &str = "/etc/kubernetes/manifests";

/// Default cluster DNS domain.
pub const DEFAULT_SERVICE_DNS_DOMAIN: &str = "cluster.local";

/// Fallback cluster DNS address when the service subnet cannot be parsed.
pub const DEFAULT_CLUSTER_DNS_IP: &str = "10.96.0.10";

/// Kubernetes configuration directory.
pub const KUBERNETES_DIR: &str = "/etc/kubernetes";

/// Kubelet healthz port.
pub const KUBELET_HEALTHZ_PORT: i32 = 10248;

/// Default CRI socket for containerd.
pub const DEFAULT_CRI_SOCKET: &str = "unix:///var/run/containerd/containerd.sock";

/// Variable name assigned in the kubelet kubeadm-flags env file.
pub const KUBELET_ENV_FILE_VARIABLE: &str = "KUBELET_KUBEADM_ARGS";

/// systemd-resolved resolver configuration.
pub const SYSTEMD_RESOLVED_RESOLV_CONF: &str = "/run/systemd/resolve/resolv.conf";

/// Default provider log file.
pub const DEFAULT_LOG_FILE: &str = "/var/log/provider-kubeadm.log";

/// Permissions for generated configuration files.
pub const CONFIG_FILE_PERMISSIONS: u32 = 0o640;

/// Permissions for generated systemd units.
pub const UNIT_FILE_PERMISSIONS: u32 = 0o644;

/// Permissions for proxy environment files.
pub const PROXY_FILE_PERMISSIONS: u32 = 0o400;
