//! Error types for the kubeadm provider.

use thiserror::Error;

/// Errors that can occur while building a plan or handling a host event.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The kubeadm binary could not be executed.
    #[error("failed to run kubeadm version: {0}")]
    VersionProbe(String),

    /// The kubeadm version output is not a semantic version.
    #[error("could not parse kubeadm version {0:?}")]
    VersionParse(String),

    /// The cluster token does not have the bootstrap-token shape.
    #[error("bootstrap token {0:?} does not match [a-z0-9]{{6}}.[a-z0-9]{{16}}")]
    InvalidToken(String),

    /// An API object has no registered group/version/kind.
    #[error("no kind registered for {0}")]
    UnregisteredKind(&'static str),

    /// The host event payload could not be decoded.
    #[error("invalid event payload: {0}")]
    Payload(String),

    /// The reset helper exited unsuccessfully. Carries its combined output.
    #[error("reset helper exited with {status}: {output}")]
    ResetScript { status: String, output: String },

    /// YAML encoding/decoding failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding/decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProviderError>;
