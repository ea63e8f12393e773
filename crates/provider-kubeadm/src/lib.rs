//! Kubeadm cluster provider for immutable-OS hosts.
//!
//! The host orchestrator hands this crate a [`Cluster`] describing the
//! node's role and cluster identity. The provider answers with a [`Plan`]:
//! an ordered list of boot stages (files to write, commands to run) that
//! drive `kubeadm` through init, join, upgrade and reconfiguration.
//!
//! Nothing here talks to a Kubernetes API server. The only side effects
//! are the `kubeadm version` probe and the reset helper script.
//!
//! # Example
//!
//! ```rust,ignore
//! use provider_kubeadm::{cluster_provider, Cluster, Role, SystemProbe};
//!
//! let cluster = Cluster {
//!     role: Role::Init,
//!     control_plane_host: "10.0.0.1".into(),
//!     cluster_token: "abcdef.1234567890123456".into(),
//!     ..Cluster::default()
//! };
//!
//! let plan = cluster_provider(&cluster, &SystemProbe)?;
//! println!("{}", plan.to_yaml()?);
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cluster;
pub mod constants;
pub mod context;
pub mod defaults;
pub mod error;
pub mod identity;
pub mod kubeadm;
pub mod kubelet_args;
pub mod logging;
pub mod plugin;
pub mod probe;
pub mod provider;
pub mod proxy;
pub mod reset;
pub mod stages;
pub mod version;

pub use cluster::{Cluster, ClusterConfig, Role};
pub use context::ClusterContext;
pub use error::ProviderError;
pub use probe::{NodeProbe, SystemProbe};
pub use provider::cluster_provider;
pub use stages::{File, Plan, Stage, Systemctl};
pub use version::{ApiSchema, KubeVersion};
