//! Probes of the local node: installed kubeadm version, machine hostname
//! and systemd unit state.
//!
//! The composer only reaches the machine through [`NodeProbe`], which keeps
//! plan generation testable without a kubeadm binary on the box.

use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(test)]
use mockall::automock;
use sysinfo::System;
use tracing::{debug, warn};

use crate::constants::DEFAULT_ROOT_PATH;
use crate::error::{ProviderError, Result};
use crate::version::KubeVersion;

/// Facts about the node the plan is rendered for.
#[cfg_attr(test, automock)]
pub trait NodeProbe {
    /// Installed kubeadm version.
    ///
    /// # Errors
    ///
    /// Returns an error if kubeadm cannot be run or its output is not a
    /// semantic version.
    fn kubeadm_version(&self, root_path: &str) -> Result<KubeVersion>;

    /// Machine hostname, lowercased.
    fn hostname(&self) -> String;

    /// Whether a systemd unit is currently active.
    fn is_service_active(&self, unit: &str) -> bool;
}

/// [`NodeProbe`] backed by the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl SystemProbe {
    /// Resolve the kubeadm binary for a root path.
    ///
    /// Agent installs ship kubeadm under `{root}/usr/bin`; otherwise the
    /// host `PATH` is used.
    #[must_use]
    pub fn kubeadm_binary(root_path: &str) -> PathBuf {
        if root_path != DEFAULT_ROOT_PATH {
            let candidate = Path::new(root_path).join("usr/bin/kubeadm");
            if let Ok(found) = which::which(&candidate) {
                return found;
            }
            debug!("kubeadm not found at {}, using PATH", candidate.display());
        }
        PathBuf::from("kubeadm")
    }
}

impl NodeProbe for SystemProbe {
    fn kubeadm_version(&self, root_path: &str) -> Result<KubeVersion> {
        let binary = Self::kubeadm_binary(root_path);
        let output = Command::new(&binary)
            .args(["version", "-o", "short"])
            .output()
            .map_err(|e| ProviderError::VersionProbe(format!("{}: {e}", binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::VersionProbe(format!(
                "{} exited with {}: {}",
                binary.display(),
                output.status,
                stderr.trim()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        debug!("kubeadm version: {}", version.trim());
        version.parse()
    }

    fn hostname(&self) -> String {
        System::host_name()
            .map(|name| name.trim().to_lowercase())
            .unwrap_or_default()
    }

    fn is_service_active(&self, unit: &str) -> bool {
        match Command::new("systemctl")
            .args(["is-active", "--quiet", unit])
            .status()
        {
            Ok(status) => status.success(),
            Err(e) => {
                warn!("could not query systemd for {unit}: {e}");
                false
            }
        }
    }
}
