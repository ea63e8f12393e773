//! The plan composer: cluster input in, ordered boot stages out.

use tracing::{debug, info};

use crate::cluster::{Cluster, Role};
use crate::context::ClusterContext;
use crate::defaults::{mutate_cluster_defaults, mutate_kubelet_defaults};
use crate::error::Result;
use crate::identity::cert_sans_revision;
use crate::kubeadm::{Config, ExtraArgs, KubeadmConfig, Schema};
use crate::kubelet_args::regenerate_kubelet_args;
use crate::probe::NodeProbe;
use crate::stages::init::init_stages;
use crate::stages::join::join_stages;
use crate::stages::pre::pre_stages;
use crate::stages::Plan;
use crate::version::ApiSchema;

const SYSTEMD_RESOLVED: &str = "systemd-resolved";

/// Build the boot plan for `cluster`.
///
/// The installed kubeadm version decides which kubeadm API generation is
/// emitted; everything else is derived from the cluster input.
///
/// # Errors
///
/// Fails if kubeadm cannot be probed, the token is not bootstrap-shaped,
/// or a configuration document cannot be rendered.
pub fn cluster_provider(cluster: &Cluster, probe: &dyn NodeProbe) -> Result<Plan> {
    let ctx = ClusterContext::from_cluster(cluster);

    let version = probe.kubeadm_version(&ctx.root_path)?;
    let schema = ApiSchema::for_version(&version);
    info!(
        role = %ctx.node_role,
        root = %ctx.root_path,
        kubeadm = %version,
        ?schema,
        "composing kubeadm plan"
    );

    match Config::parse(schema, &ctx.user_options) {
        Config::Legacy(cfg) => compose(ctx, cfg, probe),
        Config::Current(cfg) => compose(ctx, cfg, probe),
    }
}

fn compose<S: Schema>(
    mut ctx: ClusterContext,
    mut cfg: KubeadmConfig<S>,
    probe: &dyn NodeProbe,
) -> Result<Plan> {
    ctx.cluster_cidr.clone_from(&cfg.cluster.networking.pod_subnet);
    ctx.service_cidr.clone_from(&cfg.cluster.networking.service_subnet);

    let mut stages = pre_stages(&ctx);
    if ctx.node_role == Role::None {
        debug!("no node role, emitting pre-stages only");
        return Ok(Plan::new(stages));
    }

    mutate_cluster_defaults(&mut cfg.cluster, &ctx.control_plane_host);
    mutate_kubelet_defaults(
        &mut cfg.kubelet,
        &ctx.service_cidr,
        probe.is_service_active(SYSTEMD_RESOLVED),
    );

    let node_registration = if ctx.node_role == Role::Init {
        &cfg.init.node_registration
    } else {
        &cfg.join.node_registration
    };
    ctx.kubelet_args =
        regenerate_kubelet_args(&cfg.cluster, node_registration, ctx.node_role, &probe.hostname());
    ctx.cert_sans_revision = cert_sans_revision(&cfg.cluster.api_server.cert_sans)?;
    ctx.custom_node_ip = node_registration
        .kubelet_extra_args
        .get("node-ip")
        .unwrap_or_default()
        .to_string();

    let ctx = ctx;
    stages.extend(match ctx.node_role {
        Role::Init => init_stages(&ctx, &cfg)?,
        Role::ControlPlane | Role::Worker => join_stages(&ctx, &cfg)?,
        Role::None => Vec::new(),
    });

    debug!("plan has {} stages", stages.len());
    Ok(Plan::new(stages))
}
