// ABOUTME: Reachability and version queries for the runtime daemon.
// ABOUTME: Used to fail fast before a rebuild and to log what we talk to.

use async_trait::async_trait;

/// Daemon-level queries.
#[async_trait]
pub trait DaemonOps: Send + Sync {
    /// Product and API version reported by the daemon.
    async fn version(&self) -> Result<DaemonVersion, DaemonError>;

    /// Round-trip to check the socket answers.
    async fn ping(&self) -> Result<(), DaemonError>;
}

#[derive(Debug, Clone)]
pub struct DaemonVersion {
    /// "docker" or "podman".
    pub product: String,
    pub version: String,
    pub api_version: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon unreachable: {0}")]
    Unreachable(String),
}
