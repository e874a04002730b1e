// ABOUTME: Bollard-based read-only runtime access.
// ABOUTME: Supports both Docker and Podman via Docker-compatible API.

use super::detection::{RuntimeEndpoint, RuntimeType};
use super::traits::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, DaemonError, DaemonOps,
    DaemonVersion, ImageError, ImageOps, ImageSummary,
};
use crate::types::{ContainerId, ImageId};
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{ListContainersOptions, ListImagesOptions};
use std::time::Duration;

/// Request timeout handed to bollard, in seconds.
const CLIENT_TIMEOUT_SECS: u64 = 120;

/// Container runtime implementation using bollard.
///
/// Supports both Docker and Podman via Docker-compatible API.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to the socket found by [`detect_local`](super::detect_local).
    pub fn connect(endpoint: &RuntimeEndpoint) -> Result<Self, DaemonError> {
        let client = Docker::connect_with_unix(
            &endpoint.socket_path,
            CLIENT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| DaemonError::Unreachable(e.to_string()))?;
        Ok(Self::new(client, endpoint.runtime_type))
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

#[async_trait]
impl DaemonOps for BollardRuntime {
    async fn version(&self) -> Result<DaemonVersion, DaemonError> {
        let version = self
            .client
            .version()
            .await
            .map_err(|e| DaemonError::Unreachable(e.to_string()))?;

        Ok(DaemonVersion {
            product: self.runtime_type.to_string(),
            version: version.version.unwrap_or_default(),
            api_version: version.api_version.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), DaemonError> {
        self.client
            .ping()
            .await
            .map_err(|e| DaemonError::Unreachable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let opts = ListContainersOptions {
            all: filters.all,
            ..Default::default()
        };

        // Podman reports "stopping" as a container state during shutdown, but bollard
        // doesn't recognize it and fails deserialization. Retry after a short delay
        // since "stopping" is a transient state.
        let mut last_error = None;
        for attempt in 0..3 {
            match self.client.list_containers(Some(opts.clone())).await {
                Ok(containers) => {
                    return Ok(containers
                        .into_iter()
                        .map(|c| {
                            let name = c
                                .names
                                .unwrap_or_default()
                                .first()
                                .map(|n| n.trim_start_matches('/').to_string())
                                .unwrap_or_default();

                            let state = c
                                .state
                                .map(|s| format!("{:?}", s).to_lowercase())
                                .unwrap_or_default();

                            ContainerSummary {
                                id: ContainerId::new(c.id.unwrap_or_default()),
                                name,
                                image: c.image.unwrap_or_default(),
                                image_id: ImageId::new(c.image_id.unwrap_or_default()),
                                state,
                            }
                        })
                        .collect());
                }
                Err(e) => {
                    let err_str = e.to_string();
                    if (err_str.contains("unknown variant `stopping`")
                        || err_str.contains("unknown variant `stopped`"))
                        && attempt < 2
                    {
                        tracing::debug!(attempt, "transient podman state, retrying list");
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        last_error = Some(err_str);
                        continue;
                    }
                    return Err(ContainerError::Runtime(err_str));
                }
            }
        }

        Err(ContainerError::Runtime(
            last_error.unwrap_or_else(|| "list_containers failed".to_string()),
        ))
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        let opts = ListImagesOptions {
            all: false,
            digests: true,
            ..Default::default()
        };

        let images = self
            .client
            .list_images(Some(opts))
            .await
            .map_err(|e| ImageError::Runtime(format!("failed to list images: {}", e)))?;

        Ok(images
            .into_iter()
            .map(|image| ImageSummary {
                id: ImageId::new(image.id),
                repo_tags: image.repo_tags,
                repo_digests: image.repo_digests,
            })
            .collect())
    }
}
