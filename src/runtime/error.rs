// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Unifies detection, connection and query errors behind one type.

use snafu::Snafu;

use super::detection::DetectionError;
use super::traits::{ContainerError, DaemonError, ImageError};

/// Unified runtime error. Any of these aborts an inventory rebuild.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("runtime detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("runtime connection failed: {source}"))]
    Connection { source: DaemonError },

    #[snafu(display("listing containers failed: {source}"))]
    Containers { source: ContainerError },

    #[snafu(display("listing images failed: {source}"))]
    Images { source: ImageError },
}

impl From<DetectionError> for RuntimeError {
    fn from(source: DetectionError) -> Self {
        RuntimeError::Detection { source }
    }
}

impl From<DaemonError> for RuntimeError {
    fn from(source: DaemonError) -> Self {
        RuntimeError::Connection { source }
    }
}

impl From<ContainerError> for RuntimeError {
    fn from(source: ContainerError) -> Self {
        RuntimeError::Containers { source }
    }
}

impl From<ImageError> for RuntimeError {
    fn from(source: ImageError) -> Self {
        RuntimeError::Images { source }
    }
}
