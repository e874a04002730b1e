// ABOUTME: Image listing trait for container runtimes.
// ABOUTME: Reports the tags and repo digests attached to each local image.

use crate::types::ImageId;
use async_trait::async_trait;

/// Image queries.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// List all local images.
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError>;
}

/// A local image and the references the runtime associates with it.
#[derive(Debug, Clone)]
pub struct ImageSummary {
    /// Image ID (`sha256:...`).
    pub id: ImageId,
    /// `repo:tag` strings.
    pub repo_tags: Vec<String>,
    /// `repo@digest` strings.
    pub repo_digests: Vec<String>,
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("runtime error: {0}")]
    Runtime(String),
}
