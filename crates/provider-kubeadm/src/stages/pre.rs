//! Stages that run before any role-specific work.

use super::{command, quote, File, Stage};
use crate::constants::{
    DEFAULT_ROOT_PATH, KUBERNETES_SERVICES, KUBE_IMAGES_DIR, PROXY_FILE_PERMISSIONS,
    ROOT_MOUNT_DIRS, RUN_SYSTEMD_SYSTEM_DIR, UNIT_FILE_PERMISSIONS,
};
use crate::context::ClusterContext;
use crate::proxy;

pub const MOUNT_KUBERNETES_DIRECTORIES: &str = "Mount Kubernetes directories";
pub const SET_PROXY_ENV: &str = "Set proxy env";
pub const RUN_PRE_KUBEADM_COMMANDS: &str = "Run Pre Kubeadm Commands";
pub const RUN_PRE_KUBEADM_DISABLE_SWAPOFF: &str = "Run Pre Kubeadm Disable SwapOff";
pub const RUN_LOAD_KUBE_IMAGES: &str = "Run Load Kube Images";
pub const RUN_IMPORT_LOCAL_IMAGES: &str = "Run Import Local Images";

/// All pre-stages, in execution order.
///
/// A cluster root other than `/` is bind-mounted first, so every later
/// stage already sees the kubernetes directories in place.
#[must_use]
pub fn pre_stages(ctx: &ClusterContext) -> Vec<Stage> {
    let mut stages = Vec::new();
    if ctx.root_path != DEFAULT_ROOT_PATH {
        stages.push(mount_stage(ctx));
    }
    stages.extend([
        proxy_stage(ctx),
        pre_kubeadm_commands_stage(ctx),
        swap_off_stage(),
        load_kube_images_stage(ctx),
    ]);
    if ctx.import_local_images {
        stages.push(import_local_images_stage(ctx));
    }
    stages
}

/// Bind mounts from the cluster root onto the host paths kubernetes uses.
///
/// Unit names are the systemd escape of the mount target.
#[must_use]
pub fn mount_stage(ctx: &ClusterContext) -> Stage {
    let mut stage = Stage::new(MOUNT_KUBERNETES_DIRECTORIES);
    let mut commands = Vec::new();
    for rel in ROOT_MOUNT_DIRS {
        let unit = format!("{}.mount", rel.replace('/', "-"));
        let source = ctx.rooted(rel);
        let target = format!("/{rel}");

        stage = stage.with_file(File::new(
            format!("{RUN_SYSTEMD_SYSTEM_DIR}/{unit}"),
            UNIT_FILE_PERMISSIONS,
            mount_unit(&source, &target),
        ));
        commands.push(command(&["mkdir", "-p", &source]));
        commands.push(command(&["mkdir", "-p", &target]));
        commands.push(command(&["systemctl", "enable", "--now", &unit]));
    }
    stage.with_commands(commands)
}

fn mount_unit(source: &str, target: &str) -> String {
    format!(
        "[Unit]\n\
         Description=Mount {target}\n\
         Before={KUBERNETES_SERVICES}\n\
         \n\
         [Mount]\n\
         What={source}\n\
         Where={target}\n\
         Type=none\n\
         Options=bind\n\
         \n\
         [Install]\n\
         WantedBy=local-fs.target\n"
    )
}

/// Kubelet env file and runtime drop-in. Written even without a proxy so
/// that a proxy removed from the config is also removed from the node.
#[must_use]
pub fn proxy_stage(ctx: &ClusterContext) -> Stage {
    Stage::new(SET_PROXY_ENV)
        .with_file(File::new(
            proxy::kubelet_env_path(),
            PROXY_FILE_PERMISSIONS,
            proxy::kubelet_proxy_env(ctx),
        ))
        .with_file(File::new(
            proxy::containerd_dropin_path(ctx),
            PROXY_FILE_PERMISSIONS,
            proxy::containerd_proxy_env(ctx),
        ))
}

#[must_use]
pub fn pre_kubeadm_commands_stage(ctx: &ClusterContext) -> Stage {
    Stage::new(RUN_PRE_KUBEADM_COMMANDS).with_commands([command(&[
        "/bin/bash",
        &ctx.script("kube-pre-init.sh"),
        &ctx.root_path,
    ])])
}

#[must_use]
pub fn swap_off_stage() -> Stage {
    Stage::new(RUN_PRE_KUBEADM_DISABLE_SWAPOFF).with_commands([
        r"sed -i '/ swap / s/^\(.*\)$/#\1/g' /etc/fstab",
        "swapoff -a",
    ])
}

#[must_use]
pub fn load_kube_images_stage(ctx: &ClusterContext) -> Stage {
    let import = ctx.script("import.sh");
    Stage::new(RUN_LOAD_KUBE_IMAGES).with_commands([
        command(&["chmod", "+x", &import]),
        format!(
            "{} > /var/log/import-kube-images.log",
            command(&["/bin/sh", &import, &ctx.rooted(KUBE_IMAGES_DIR), &ctx.root_path])
        ),
    ])
}

#[must_use]
pub fn import_local_images_stage(ctx: &ClusterContext) -> Stage {
    let import = ctx.script("import.sh");
    Stage::new(RUN_IMPORT_LOCAL_IMAGES)
        .with_guard(format!("[ -d {} ]", quote(&ctx.local_images_path)))
        .with_commands([
            command(&["chmod", "+x", &import]),
            format!(
                "{} > /var/log/import.log",
                command(&["/bin/sh", &import, &ctx.local_images_path])
            ),
        ])
}
