//! Stages for nodes joining an existing cluster (`kubeadm join`).

use super::{
    config_path, file_stage, helper_command, reconfigure_stage, touch, unless_exists,
    upgrade_stage, Stage, CLUSTER_CONFIG_FILE, GENERATE_CLUSTER_CONFIG_FILE,
    GENERATE_KUBELET_CONFIG_FILE, KUBEADM_CONFIG_FILE, KUBELET_CONFIG_FILE,
};
use crate::cluster::Role;
use crate::constants::{DEFAULT_API_ADVERTISE_ADDRESS, KUBEADM_JOIN_SENTINEL};
use crate::context::ClusterContext;
use crate::error::Result;
use crate::identity::certificate_key;
use crate::kubeadm::{
    BootstrapTokenDiscovery, JoinConfiguration, KubeadmConfig, Schema, YamlPrinter,
};

pub const GENERATE_KUBEADM_JOIN_CONFIG_FILE: &str = "Generate Kubeadm Join Config File";
pub const RUN_KUBEADM_JOIN: &str = "Run Kubeadm Join";
pub const RUN_KUBEADM_JOIN_UPGRADE: &str = "Run Kubeadm Join Upgrade";
pub const RUN_KUBEADM_JOIN_RECONFIGURATION: &str = "Run Kubeadm Join Reconfiguration";

/// Join stages, in execution order. Control-plane nodes additionally get
/// the cluster and kubelet snapshots.
///
/// # Errors
///
/// Fails if a document cannot be rendered.
pub fn join_stages<S: Schema>(ctx: &ClusterContext, cfg: &KubeadmConfig<S>) -> Result<Vec<Stage>> {
    let join = join_configuration(ctx, &cfg.join);

    let mut join_yaml = YamlPrinter::default();
    join_yaml.print(&join)?;

    let mut stages = vec![
        file_stage(
            GENERATE_KUBEADM_JOIN_CONFIG_FILE,
            config_path(ctx, KUBEADM_CONFIG_FILE),
            join_yaml.finish(),
        ),
        join_stage(ctx),
        upgrade_stage(ctx, RUN_KUBEADM_JOIN_UPGRADE),
    ];

    if ctx.node_role == Role::ControlPlane {
        let mut init = cfg.init.clone();
        if let Some(control_plane) = &join.control_plane {
            init.local_api_endpoint = control_plane.local_api_endpoint.clone();
        }

        let mut cluster_yaml = YamlPrinter::default();
        cluster_yaml
            .print(&cfg.cluster)?
            .print(&init)?
            .print(&join)?;

        let mut kubelet_yaml = YamlPrinter::default();
        kubelet_yaml.print(&cfg.kubelet)?;

        stages.push(file_stage(
            GENERATE_CLUSTER_CONFIG_FILE,
            config_path(ctx, CLUSTER_CONFIG_FILE),
            cluster_yaml.finish(),
        ));
        stages.push(file_stage(
            GENERATE_KUBELET_CONFIG_FILE,
            config_path(ctx, KUBELET_CONFIG_FILE),
            kubelet_yaml.finish(),
        ));
    }

    stages.push(reconfigure_stage(ctx, RUN_KUBEADM_JOIN_RECONFIGURATION));
    Ok(stages)
}

/// Fill discovery and, for control-plane nodes, the control-plane block of
/// the user's join configuration.
#[must_use]
pub fn join_configuration<S: Schema>(
    ctx: &ClusterContext,
    user: &JoinConfiguration<S>,
) -> JoinConfiguration<S> {
    let mut join = user.clone();

    join.discovery
        .bootstrap_token
        .get_or_insert_with(|| BootstrapTokenDiscovery {
            token: ctx.cluster_token.clone(),
            api_server_endpoint: ctx.control_plane_endpoint(),
            unsafe_skip_ca_verification: true,
            ..BootstrapTokenDiscovery::default()
        });

    if ctx.node_role == Role::ControlPlane {
        let control_plane = join.control_plane.get_or_insert_with(Default::default);
        control_plane.certificate_key = certificate_key(&ctx.cluster_token);

        let endpoint = &mut control_plane.local_api_endpoint;
        if endpoint.advertise_address.is_empty() {
            endpoint.advertise_address = DEFAULT_API_ADVERTISE_ADDRESS.to_string();
        }
    }

    join
}

fn join_stage(ctx: &ClusterContext) -> Stage {
    let sentinel = ctx.rooted(KUBEADM_JOIN_SENTINEL);
    Stage::new(RUN_KUBEADM_JOIN)
        .with_guard(unless_exists(&sentinel))
        .with_commands([
            helper_command(
                ctx,
                "kube-join.sh",
                &[ctx.node_role.as_str(), &ctx.root_path],
                true,
            ),
            touch(&sentinel),
        ])
}
