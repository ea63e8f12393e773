//! Stages for the first control-plane node (`kubeadm init`).

use super::{
    config_path, file_stage, helper_command, reconfigure_stage, touch, unless_exists,
    upgrade_stage, Stage, CLUSTER_CONFIG_FILE, GENERATE_CLUSTER_CONFIG_FILE,
    GENERATE_KUBELET_CONFIG_FILE, KUBEADM_CONFIG_FILE, KUBELET_CONFIG_FILE,
};
use crate::constants::{
    DEFAULT_API_ADVERTISE_ADDRESS, KUBEADM_INIT_SENTINEL, POST_KUBEADM_INIT_SENTINEL,
};
use crate::context::ClusterContext;
use crate::error::Result;
use crate::identity::{certificate_key, BootstrapTokenString};
use crate::kubeadm::{BootstrapToken, InitConfiguration, KubeadmConfig, Schema, YamlPrinter};

pub const GENERATE_KUBEADM_INIT_CONFIG_FILE: &str = "Generate Kubeadm Init Config File";
pub const RUN_KUBEADM_INIT: &str = "Run Kubeadm Init";
pub const RUN_POST_KUBEADM_INIT: &str = "Run Post Kubeadm Init";
pub const RUN_KUBEADM_INIT_UPGRADE: &str = "Run Kubeadm Init Upgrade";
pub const RUN_KUBEADM_RECONFIGURATION: &str = "Run Kubeadm Reconfiguration";

/// Init stages, in execution order.
///
/// `cfg` must already carry the cluster and kubelet defaults.
///
/// # Errors
///
/// Fails if the cluster token is not bootstrap-shaped or a document cannot
/// be rendered.
pub fn init_stages<S: Schema>(ctx: &ClusterContext, cfg: &KubeadmConfig<S>) -> Result<Vec<Stage>> {
    let init = init_configuration(ctx, &cfg.init)?;

    let mut kubeadm_yaml = YamlPrinter::default();
    kubeadm_yaml
        .print(&cfg.cluster)?
        .print(&init)?
        .print(&cfg.kubelet)?;

    let mut cluster_yaml = YamlPrinter::default();
    cluster_yaml.print(&cfg.cluster)?.print(&init)?;

    let mut kubelet_yaml = YamlPrinter::default();
    kubelet_yaml.print(&cfg.kubelet)?;

    Ok(vec![
        file_stage(
            GENERATE_KUBEADM_INIT_CONFIG_FILE,
            config_path(ctx, KUBEADM_CONFIG_FILE),
            kubeadm_yaml.finish(),
        ),
        init_stage(ctx),
        post_init_stage(ctx),
        file_stage(
            GENERATE_CLUSTER_CONFIG_FILE,
            config_path(ctx, CLUSTER_CONFIG_FILE),
            cluster_yaml.finish(),
        ),
        upgrade_stage(ctx, RUN_KUBEADM_INIT_UPGRADE),
        file_stage(
            GENERATE_KUBELET_CONFIG_FILE,
            config_path(ctx, KUBELET_CONFIG_FILE),
            kubelet_yaml.finish(),
        ),
        reconfigure_stage(ctx, RUN_KUBEADM_RECONFIGURATION),
    ])
}

/// Stamp the node's bootstrap token, certificate key and local endpoint
/// onto the user's init configuration.
///
/// # Errors
///
/// Returns [`crate::ProviderError::InvalidToken`] if the context token is
/// not bootstrap-shaped.
pub fn init_configuration<S: Schema>(
    ctx: &ClusterContext,
    user: &InitConfiguration<S>,
) -> Result<InitConfiguration<S>> {
    let token = BootstrapTokenString::parse(&ctx.cluster_token)?;

    let mut init = user.clone();
    init.bootstrap_tokens = vec![BootstrapToken {
        token: token.to_string(),
        ttl: Some("0s".to_string()),
        ..BootstrapToken::default()
    }];
    init.certificate_key = certificate_key(&ctx.cluster_token);
    if init.local_api_endpoint.advertise_address.is_empty() {
        init.local_api_endpoint.advertise_address = DEFAULT_API_ADVERTISE_ADDRESS.to_string();
    }
    Ok(init)
}

fn init_stage(ctx: &ClusterContext) -> Stage {
    let sentinel = ctx.rooted(KUBEADM_INIT_SENTINEL);
    Stage::new(RUN_KUBEADM_INIT)
        .with_guard(unless_exists(&sentinel))
        .with_commands([
            helper_command(ctx, "kube-init.sh", &[&ctx.root_path], true),
            touch(&sentinel),
        ])
}

fn post_init_stage(ctx: &ClusterContext) -> Stage {
    let sentinel = ctx.rooted(POST_KUBEADM_INIT_SENTINEL);
    Stage::new(RUN_POST_KUBEADM_INIT)
        .with_guard(unless_exists(&sentinel))
        .with_commands([
            helper_command(ctx, "kube-post-init.sh", &[&ctx.root_path], false),
            touch(&sentinel),
        ])
}
