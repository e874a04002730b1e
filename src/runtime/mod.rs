// ABOUTME: Read-only container runtime access for Docker and Podman.
// ABOUTME: Detects the local socket and captures container/image snapshots.

mod bollard;
mod detection;
mod error;
mod snapshot;
pub mod traits;

pub use bollard::BollardRuntime;
pub use detection::{
    DetectionError, RuntimeConfig, RuntimeEndpoint, RuntimeType, detect_local, detect_local_with,
};
pub use error::RuntimeError;
pub use snapshot::{ContainerSnapshot, ImageSnapshot, RunState, RuntimeSnapshot};
pub use traits::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, DaemonError, DaemonOps,
    DaemonVersion, ImageError, ImageOps, ImageSummary, InventoryRuntime,
};
