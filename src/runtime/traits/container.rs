// ABOUTME: Container listing trait for container runtimes.
// ABOUTME: Lists running and stopped containers with their image identity.

use crate::types::{ContainerId, ImageId};
use async_trait::async_trait;

/// Container queries.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// List containers, stopped ones included when `filters.all` is set.
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError>;
}

/// Filters for listing containers.
#[derive(Debug, Clone, Default)]
pub struct ContainerFilters {
    /// Include stopped containers.
    pub all: bool,
}

/// Summary information about a container.
#[derive(Debug, Clone)]
pub struct ContainerSummary {
    /// Container ID.
    pub id: ContainerId,
    /// Container name without the leading slash.
    pub name: String,
    /// Image string the container was created from.
    pub image: String,
    /// Resolved image ID (`sha256:...`).
    pub image_id: ImageId,
    /// Current state as reported by the runtime (lowercase).
    pub state: String,
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("runtime error: {0}")]
    Runtime(String),
}
