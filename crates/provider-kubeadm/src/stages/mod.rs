//! Plan and stage records plus the per-role stage builders.
//!
//! A [`Plan`] is what the host executes at boot: one `boot.before` phase
//! holding an ordered list of [`Stage`]s. Stages are plain data; nothing
//! in this module touches the filesystem.

pub mod init;
pub mod join;
pub mod pre;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{BOOT_BEFORE, CONFIGURATION_DIR, CONFIG_FILE_PERMISSIONS, PLAN_NAME};
use crate::context::ClusterContext;
use crate::error::Result;
use crate::proxy;

pub const GENERATE_CLUSTER_CONFIG_FILE: &str = "Generate Cluster Config File";
pub const GENERATE_KUBELET_CONFIG_FILE: &str = "Generate Kubelet Config File";

/// Generated kubeadm configuration, consumed by init/join.
pub const KUBEADM_CONFIG_FILE: &str = "kubeadm.yaml";
/// Cluster snapshot consumed by the reconfigure helper.
pub const CLUSTER_CONFIG_FILE: &str = "cluster-config.yaml";
/// Kubelet snapshot consumed by the reconfigure helper.
pub const KUBELET_CONFIG_FILE: &str = "kubelet-config.yaml";

/// A file materialized by a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: String,
    /// Unix mode, serialized as a plain integer (`0o640` is `416`).
    pub permissions: u32,
    pub content: String,
}

impl File {
    #[must_use]
    pub fn new(path: impl Into<String>, permissions: u32, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            permissions,
            content: content.into(),
        }
    }
}

/// systemd units to enable/start before the stage runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Systemctl {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enable: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub start: Vec<String>,
}

impl Systemctl {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enable.is_empty() && self.start.is_empty()
    }
}

/// One named step of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage {
    pub name: String,
    /// Shell test; the stage only runs when it succeeds.
    #[serde(rename = "if", skip_serializing_if = "String::is_empty")]
    pub guard: String,
    #[serde(skip_serializing_if = "Systemctl::is_empty")]
    pub systemctl: Systemctl,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

impl Stage {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = guard.into();
        self
    }

    #[must_use]
    pub fn with_commands<I, C>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }
}

/// A stage whose only effect is writing one configuration file (`0640`).
#[must_use]
pub fn file_stage(name: &str, path: impl Into<String>, content: impl Into<String>) -> Stage {
    Stage::new(name).with_file(File::new(path, CONFIG_FILE_PERMISSIONS, content))
}

/// The document returned to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub stages: BTreeMap<String, Vec<Stage>>,
}

impl Plan {
    /// A plan running `stages` in the `boot.before` phase.
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            name: PLAN_NAME.to_string(),
            stages: BTreeMap::from([(BOOT_BEFORE.to_string(), stages)]),
        }
    }

    /// An empty plan, returned when there is no cluster to provision.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Stages of the `boot.before` phase.
    #[must_use]
    pub fn boot_stages(&self) -> &[Stage] {
        self.stages.get(BOOT_BEFORE).map_or(&[], Vec::as_slice)
    }

    /// Names of the `boot.before` stages, in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.boot_stages().iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a stage by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.boot_stages().iter().find(|s| s.name == name)
    }

    /// Render the plan as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Quote one word for a POSIX shell. Plain words pass through unchanged.
#[must_use]
pub fn quote(word: &str) -> String {
    let cleaned = word.replace('\0', "");
    shlex::try_quote(&cleaned)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default()
}

/// Join words into a command line, quoting each.
#[must_use]
pub fn command<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| quote(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `[ ! -f <path> ]`
#[must_use]
pub fn unless_exists(path: &str) -> String {
    format!("[ ! -f {} ]", quote(path))
}

/// `touch <path>`
#[must_use]
pub fn touch(path: &str) -> String {
    command(&["touch", path])
}

/// Path of a generated configuration file under the cluster root.
#[must_use]
pub fn config_path(ctx: &ClusterContext, file: &str) -> String {
    ctx.rooted(&format!("{CONFIGURATION_DIR}/{file}"))
}

/// `bash <script> <args...>`, followed by the proxy settings when a proxy
/// is configured. `proxy_flag` prefixes them with a literal `true`.
fn helper_command(ctx: &ClusterContext, script: &str, args: &[&str], proxy_flag: bool) -> String {
    let mut words = vec!["bash".to_string(), ctx.script(script)];
    words.extend(args.iter().map(ToString::to_string));
    if let Some(proxy) = proxy::proxy_args(ctx) {
        if proxy_flag {
            words.push("true".to_string());
        }
        words.extend(proxy);
    }
    command(&words)
}

/// `kube-upgrade.sh` for the node's role.
fn upgrade_stage(ctx: &ClusterContext, name: &str) -> Stage {
    Stage::new(name).with_commands([helper_command(
        ctx,
        "kube-upgrade.sh",
        &[ctx.node_role.as_str(), &ctx.root_path],
        true,
    )])
}

/// `kube-reconfigure.sh` with the values cached on the context.
fn reconfigure_stage(ctx: &ClusterContext, name: &str) -> Stage {
    Stage::new(name).with_commands([helper_command(
        ctx,
        "kube-reconfigure.sh",
        &[
            ctx.node_role.as_str(),
            &ctx.cert_sans_revision,
            &ctx.kubelet_args,
            &ctx.root_path,
            &ctx.custom_node_ip,
        ],
        false,
    )])
}
