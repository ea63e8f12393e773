//! Deterministic identity helpers: certificate keys, bootstrap tokens and
//! the cert-SAN revision hash.
//!
//! All of these are pure. Every node of a cluster derives the same values
//! from the same shared cluster token.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::{ProviderError, Result};

/// Bootstrap token shape accepted by kubeadm.
static BOOTSTRAP_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]{6})\.([a-z0-9]{16})$").expect("bootstrap token regex is valid")
});

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Derive the certificate key used to encrypt uploaded control-plane certs.
///
/// Hex-encoded SHA-256 of `token` (64 characters).
#[must_use]
pub fn certificate_key(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

/// Reshape an arbitrary cluster token into `xxxxxx.yyyyyyyyyyyyyyyy`.
///
/// The ID is the last six hex characters of the token's SHA-256, the
/// secret the first sixteen.
#[must_use]
pub fn transform_token(cluster_token: &str) -> String {
    let digest = sha256_hex(cluster_token.as_bytes());
    format!("{}.{}", &digest[digest.len() - 6..], &digest[..16])
}

/// Opaque revision of the API server cert-SAN set.
///
/// Changes whenever the SAN list changes, so the reconfigure helper knows
/// to regenerate the serving certificate.
///
/// # Errors
///
/// Returns [`ProviderError::Json`] if the SAN list cannot be encoded.
pub fn cert_sans_revision(cert_sans: &[String]) -> Result<String> {
    let encoded = serde_json::to_vec(cert_sans)?;
    Ok(sha256_hex(&encoded))
}

/// A bootstrap token split into its public ID and secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapTokenString {
    /// Public token ID (six characters).
    pub id: String,
    /// Token secret (sixteen characters).
    pub secret: String,
}

impl BootstrapTokenString {
    /// Split a token string, rejecting anything that is not bootstrap-shaped.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidToken`] on a regex mismatch.
    pub fn parse(token: &str) -> Result<Self> {
        let caps = BOOTSTRAP_TOKEN_RE
            .captures(token)
            .ok_or_else(|| ProviderError::InvalidToken(token.to_string()))?;
        Ok(Self {
            id: caps[1].to_string(),
            secret: caps[2].to_string(),
        })
    }
}

impl fmt::Display for BootstrapTokenString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.secret)
    }
}
