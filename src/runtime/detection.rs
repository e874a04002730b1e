// ABOUTME: Locates the local Docker or Podman API socket.
// ABOUTME: Honours explicit config, then checks Podman sockets, then Docker.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which daemon answers on the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        })
    }
}

/// A socket speaking the Docker-compatible API.
#[derive(Debug, Clone)]
pub struct RuntimeEndpoint {
    pub runtime_type: RuntimeType,
    pub socket_path: String,
}

/// `runtime:` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Daemon type; Docker when only a socket is given.
    pub runtime: Option<RuntimeType>,
    /// Socket path, skipping auto-detection.
    pub socket: Option<String>,
}

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,

    #[error("configured runtime socket does not exist: {0}")]
    SocketMissing(String),
}

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Detect container runtime on the local system.
///
/// Detection order:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_local() -> Result<RuntimeEndpoint, DetectionError> {
    detect_local_with(None)
}

/// Detect the local runtime, letting explicit configuration take precedence.
///
/// A configured socket without a runtime type is assumed to speak the Docker
/// API and is used as-is once it exists on disk.
pub fn detect_local_with(config: Option<&RuntimeConfig>) -> Result<RuntimeEndpoint, DetectionError> {
    if let Some(cfg) = config
        && (cfg.runtime.is_some() || cfg.socket.is_some())
    {
        let runtime_type = cfg.runtime.unwrap_or(RuntimeType::Docker);
        let socket_path = cfg
            .socket
            .clone()
            .unwrap_or_else(|| default_socket_path(runtime_type));
        if !Path::new(&socket_path).exists() {
            return Err(DetectionError::SocketMissing(socket_path));
        }
        return Ok(RuntimeEndpoint {
            runtime_type,
            socket_path,
        });
    }

    // 1. Rootless Podman
    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Ok(RuntimeEndpoint {
                runtime_type: RuntimeType::Podman,
                socket_path: rootless_socket,
            });
        }
    }

    // 2. Rootful Podman
    if Path::new(ROOTFUL_PODMAN).exists() {
        return Ok(RuntimeEndpoint {
            runtime_type: RuntimeType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
        });
    }

    // 3. Docker
    if Path::new(DOCKER_SOCKET).exists() {
        return Ok(RuntimeEndpoint {
            runtime_type: RuntimeType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
        });
    }

    Err(DetectionError::NoRuntimeFound)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

fn default_socket_path(runtime: RuntimeType) -> String {
    match runtime {
        RuntimeType::Docker => DOCKER_SOCKET.to_string(),
        RuntimeType::Podman => ROOTFUL_PODMAN.to_string(),
    }
}
