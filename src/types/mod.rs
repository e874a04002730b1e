// ABOUTME: Type-safe identifiers and image reference normalization.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod image_ref;

pub use id::{ContainerId, Id, ImageId, RecordId};
pub use image_ref::{DEFAULT_REGISTRY, ImageRef, digest_hex, short_digest};
