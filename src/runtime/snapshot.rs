// ABOUTME: Point-in-time view of the runtime's containers and images.
// ABOUTME: Resolves a container's effective image reference and digest.

use super::error::RuntimeError;
use super::traits::{ContainerFilters, ContainerOps, ImageOps};
use crate::types::{ContainerId, ImageId, ImageRef, digest_hex};
use serde::{Deserialize, Serialize};

/// Coarse container state shared by snapshots and inventory records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Stopped,
    Paused,
    Unknown,
}

impl RunState {
    /// Map a runtime-reported state string.
    ///
    /// Anything other than running or paused (created, exited, dead, ...)
    /// counts as stopped; a missing state is unknown.
    pub fn from_runtime(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "" => RunState::Unknown,
            "running" => RunState::Running,
            "paused" => RunState::Paused,
            _ => RunState::Stopped,
        }
    }

    /// Aggregate over a group of containers: running beats paused beats stopped.
    pub fn aggregate<'a>(states: impl IntoIterator<Item = &'a RunState>) -> Self {
        let mut any = false;
        let mut paused = false;
        for state in states {
            any = true;
            match state {
                RunState::Running => return RunState::Running,
                RunState::Paused => paused = true,
                _ => {}
            }
        }
        if paused {
            RunState::Paused
        } else if any {
            RunState::Stopped
        } else {
            RunState::Unknown
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::Running => "running",
            RunState::Stopped => "stopped",
            RunState::Paused => "paused",
            RunState::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// One container as seen in a snapshot.
#[derive(Debug, Clone)]
pub struct ContainerSnapshot {
    pub id: ContainerId,
    pub name: String,
    /// Image string the container was declared with.
    pub image: String,
    /// Resolved image ID.
    pub image_id: ImageId,
    pub state: RunState,
}

/// One local image and its known references.
#[derive(Debug, Clone)]
pub struct ImageSnapshot {
    pub id: ImageId,
    pub repo_tags: Vec<String>,
    pub repo_digests: Vec<String>,
}

/// Containers and images captured together in one refresh.
#[derive(Debug, Clone, Default)]
pub struct RuntimeSnapshot {
    pub containers: Vec<ContainerSnapshot>,
    pub images: Vec<ImageSnapshot>,
}

impl RuntimeSnapshot {
    /// Query the runtime for all containers (including stopped) and all images.
    ///
    /// Both listings run concurrently; either failing fails the whole snapshot.
    pub async fn capture<R>(runtime: &R) -> Result<Self, RuntimeError>
    where
        R: ContainerOps + ImageOps + ?Sized,
    {
        let filters = ContainerFilters {
            all: true,
            ..Default::default()
        };
        let (containers, images) =
            tokio::join!(runtime.list_containers(&filters), runtime.list_images());
        let containers = containers?;
        let images = images?;

        let containers = containers
            .into_iter()
            .map(|c| ContainerSnapshot {
                state: RunState::from_runtime(&c.state),
                id: c.id,
                name: c.name,
                image: c.image,
                image_id: c.image_id,
            })
            .collect::<Vec<_>>();

        let images = images
            .into_iter()
            .map(|i| ImageSnapshot {
                id: i.id,
                repo_tags: i.repo_tags,
                repo_digests: i.repo_digests,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            containers = containers.len(),
            images = images.len(),
            "captured runtime snapshot"
        );

        Ok(Self { containers, images })
    }

    pub fn image(&self, id: &ImageId) -> Option<&ImageSnapshot> {
        self.images.iter().find(|image| &image.id == id)
    }

    /// Best-known reference for a container: the image's first real tag,
    /// else the string the container was created with.
    pub fn image_ref_for(&self, container: &ContainerSnapshot) -> ImageRef {
        let tagged = self.image(&container.image_id).and_then(|image| {
            image
                .repo_tags
                .iter()
                .find(|tag| !tag.starts_with("<none>"))
        });
        ImageRef::parse(tagged.map_or(container.image.as_str(), String::as_str))
    }

    /// Digest (`sha256:...`) the runtime recorded for an image.
    ///
    /// Prefers a repo digest whose repository matches `repo_key`, falling back
    /// to the first one listed.
    pub fn image_digest(&self, id: &ImageId, repo_key: Option<&str>) -> Option<String> {
        let image = self.image(id)?;
        let preferred = repo_key.and_then(|key| {
            image.repo_digests.iter().find(|entry| {
                entry
                    .split_once('@')
                    .is_some_and(|(repo, _)| ImageRef::parse(repo).canonical_key() == key)
            })
        });
        let entry = preferred.or_else(|| image.repo_digests.first())?;
        let digest = entry.rsplit_once('@').map_or(entry.as_str(), |(_, d)| d);
        if digest_hex(digest).is_empty() {
            None
        } else {
            Some(digest.to_string())
        }
    }
}
