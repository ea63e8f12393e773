//! Cluster reset: runs the reset helper under the node's cluster root.

use std::process::Command;

use tracing::{error, info};

use crate::context::ClusterContext;
use crate::error::{ProviderError, Result};
use crate::plugin::{Event, EventPayload, EventResponse};
use crate::stages::command;

/// Handle a `cluster.reset` event. Failures are reported in the response.
#[must_use]
pub fn handle_cluster_reset(event: &Event) -> EventResponse {
    match reset_cluster(&event.data) {
        Ok(output) => EventResponse {
            logs: output,
            ..EventResponse::default()
        },
        Err(e) => {
            error!("cluster reset failed: {e}");
            EventResponse::with_error(e.to_string())
        }
    }
}

/// Recover the cluster root from the event payload and run `kube-reset.sh`.
/// Returns the helper's combined output.
///
/// # Errors
///
/// Fails if the payload cannot be decoded, the shell cannot be spawned, or
/// the helper exits non-zero.
pub fn reset_cluster(payload: &str) -> Result<String> {
    let config = EventPayload::parse(payload)?.cluster_config()?;
    let ctx = ClusterContext::from_cluster(&config.cluster.unwrap_or_default());
    run_reset_script(&ctx)
}

/// `/bin/sh -c "sh <root>/opt/kubeadm/scripts/kube-reset.sh <root>"`
///
/// # Errors
///
/// Fails if the shell cannot be spawned or the helper exits non-zero.
pub fn run_reset_script(ctx: &ClusterContext) -> Result<String> {
    let script = command(&["sh", &ctx.script("kube-reset.sh"), &ctx.root_path]);
    info!("resetting cluster: {script}");

    let output = Command::new("/bin/sh").arg("-c").arg(&script).output()?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(combined)
    } else {
        Err(ProviderError::ResetScript {
            status: output.status.to_string(),
            output: combined,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::cluster::{Cluster, Role};
    use crate::constants::CLUSTER_ROOT_PATH_OPTION;

    fn root_with_script(body: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("opt/kubeadm/scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("kube-reset.sh"), body).unwrap();
        dir
    }

    fn ctx(root: &TempDir) -> ClusterContext {
        let mut cluster = Cluster {
            role: Role::Worker,
            ..Cluster::default()
        };
        cluster.provider_options.insert(
            CLUSTER_ROOT_PATH_OPTION.into(),
            root.path().to_string_lossy().into_owned(),
        );
        ClusterContext::from_cluster(&cluster)
    }

    #[test]
    fn test_script_receives_root() {
        let root = root_with_script("echo \"reset $1\"\n");
        let c = ctx(&root);
        let output = run_reset_script(&c).unwrap();
        assert_eq!(output.trim(), format!("reset {}", c.root_path));
    }

    #[test]
    fn test_failure_carries_output() {
        let root = root_with_script("echo boom >&2\nexit 1\n");
        let err = run_reset_script(&ctx(&root)).unwrap_err();
        match err {
            ProviderError::ResetScript { output, .. } => assert_eq!(output.trim(), "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_payload() {
        let response = handle_cluster_reset(&Event {
            name: "cluster.reset".into(),
            data: "{not json".into(),
            ..Event::default()
        });
        assert!(!response.error.is_empty());
    }
}
