//! Host plugin protocol.
//!
//! The host runs the binary with the bus event name as its argument and an
//! [`Event`] as JSON on stdin, and reads an [`EventResponse`] from stdout.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cluster::ClusterConfig;
use crate::error::{ProviderError, Result};
use crate::probe::NodeProbe;
use crate::provider::cluster_provider;
use crate::reset::handle_cluster_reset;
use crate::stages::Plan;

/// Bus event asking for the boot plan.
pub const EVENT_CLUSTER_PROVISION: &str = "cluster.provision";

/// Bus event asking to tear the node's cluster state down.
pub const EVENT_CLUSTER_RESET: &str = "cluster.reset";

/// An event delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub name: String,
    /// JSON-encoded [`EventPayload`].
    pub data: String,
    pub file: String,
}

/// The answer written back to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventResponse {
    pub state: String,
    pub data: String,
    pub error: String,
    pub logs: String,
}

impl EventResponse {
    #[must_use]
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

/// `data` of cluster events: the host configuration as YAML text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    pub config: String,
}

impl EventPayload {
    /// Decode an event's `data` field. Empty data is an empty payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Payload`] if `data` is not a JSON payload.
    pub fn parse(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(data).map_err(|e| ProviderError::Payload(e.to_string()))
    }

    /// The host configuration carried by the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Payload`] if `config` is not valid YAML.
    pub fn cluster_config(&self) -> Result<ClusterConfig> {
        if self.config.trim().is_empty() {
            return Ok(ClusterConfig::default());
        }
        serde_yaml::from_str(&self.config).map_err(|e| ProviderError::Payload(e.to_string()))
    }
}

/// Dispatch one host event.
///
/// Provisioning failures are returned as errors and abort the invocation.
/// Reset failures are reported inside the response. Unknown events get an
/// empty response.
///
/// # Errors
///
/// Fails if a provisioning payload cannot be decoded or the plan cannot be
/// built.
pub fn handle_event(event: &Event, probe: &dyn NodeProbe) -> Result<EventResponse> {
    match event.name.as_str() {
        EVENT_CLUSTER_PROVISION => provision(event, probe),
        EVENT_CLUSTER_RESET => Ok(handle_cluster_reset(event)),
        other => {
            debug!("ignoring event {other:?}");
            Ok(EventResponse::default())
        }
    }
}

fn provision(event: &Event, probe: &dyn NodeProbe) -> Result<EventResponse> {
    let config = EventPayload::parse(&event.data)?.cluster_config()?;

    let plan = match config.cluster {
        Some(cluster) => cluster_provider(&cluster, probe)?,
        None => {
            info!("no cluster block in configuration, returning an empty plan");
            Plan::empty()
        }
    };

    Ok(EventResponse::with_data(plan.to_yaml()?))
}
