//! Normalized per-invocation view of the cluster input.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::cluster::{Cluster, Role};
use crate::constants::{
    API_SERVER_PORT, CLUSTER_ROOT_PATH_OPTION, CONTAINERD_SERVICE, DEFAULT_ROOT_PATH,
    HELPER_SCRIPT_DIR, LOCAL_IMAGES_DIR, SPECTRO_CONTAINERD_OPTION, SPECTRO_CONTAINERD_SERVICE,
};
use crate::identity::transform_token;

/// Everything the stage builders need to know about this node.
///
/// Built once by [`ClusterContext::from_cluster`]. Only the composer fills
/// the late fields (`service_cidr`, `cluster_cidr`, `kubelet_args`,
/// `cert_sans_revision`, `custom_node_ip`), and only before it starts on
/// the role stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterContext {
    pub root_path: String,
    pub node_role: Role,
    pub control_plane_host: String,
    /// Bootstrap-shaped token derived from the cluster token.
    pub cluster_token: String,
    #[serde(skip)]
    pub user_options: String,
    pub env_config: BTreeMap<String, String>,
    pub containerd_service_folder_name: String,
    pub local_images_path: String,
    pub import_local_images: bool,
    pub service_cidr: String,
    pub cluster_cidr: String,
    pub kubelet_args: String,
    pub cert_sans_revision: String,
    pub custom_node_ip: String,
}

impl ClusterContext {
    #[must_use]
    pub fn from_cluster(cluster: &Cluster) -> Self {
        let root_path = cluster
            .provider_options
            .get(CLUSTER_ROOT_PATH_OPTION)
            .map(|p| normalize_root(p))
            .unwrap_or_else(|| DEFAULT_ROOT_PATH.to_string());

        let containerd_service_folder_name =
            if cluster.provider_options.contains_key(SPECTRO_CONTAINERD_OPTION) {
                SPECTRO_CONTAINERD_SERVICE
            } else {
                CONTAINERD_SERVICE
            };

        let local_images_path = if cluster.local_images_path.is_empty() {
            join(&root_path, LOCAL_IMAGES_DIR)
        } else {
            cluster.local_images_path.clone()
        };

        Self {
            node_role: cluster.role,
            control_plane_host: cluster.control_plane_host.clone(),
            cluster_token: transform_token(&cluster.cluster_token),
            user_options: cluster.options.clone(),
            env_config: cluster.env.clone(),
            containerd_service_folder_name: containerd_service_folder_name.to_string(),
            local_images_path,
            import_local_images: cluster.import_local_images,
            root_path,
            ..Self::default()
        }
    }

    /// `rel` placed under the cluster root.
    #[must_use]
    pub fn rooted(&self, rel: &str) -> String {
        join(&self.root_path, rel)
    }

    /// Path of a helper script under the cluster root.
    #[must_use]
    pub fn script(&self, name: &str) -> String {
        join(&self.root_path, &format!("{HELPER_SCRIPT_DIR}/{name}"))
    }

    /// Value of an environment key, empty when unset.
    #[must_use]
    pub fn env(&self, key: &str) -> &str {
        self.env_config.get(key).map_or("", String::as_str)
    }

    /// `host:6443` endpoint of the control plane.
    #[must_use]
    pub fn control_plane_endpoint(&self) -> String {
        format!("{}:{API_SERVER_PORT}", self.control_plane_host)
    }
}

fn normalize_root(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_ROOT_PATH.to_string()
    } else {
        trimmed.to_string()
    }
}

fn join(root: &str, rel: &str) -> String {
    Path::new(root).join(rel).to_string_lossy().into_owned()
}
