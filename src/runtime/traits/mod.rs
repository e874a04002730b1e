// ABOUTME: Capability traits for read-only container runtime queries.
// ABOUTME: Defines ContainerOps, ImageOps and DaemonOps.

mod container;
mod daemon;
mod image;

pub use container::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
pub use daemon::{DaemonError, DaemonOps, DaemonVersion};
pub use image::{ImageError, ImageOps, ImageSummary};

/// Everything the inventory needs from a runtime.
pub trait InventoryRuntime: ContainerOps + ImageOps {}

impl<T: ContainerOps + ImageOps> InventoryRuntime for T {}
