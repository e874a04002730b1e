// ABOUTME: Persisted inventory record describing one deployed image.
// ABOUTME: Either a compose-declared service or a group of undeclared running containers.

use crate::registry::homepage_url;
use crate::runtime::RunState;
use crate::types::{DEFAULT_REGISTRY, ImageRef, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Declared by a compose service.
    Compose,
    /// Running containers not declared in any discovered manifest.
    Socket,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Compose => write!(f, "compose"),
            Source::Socket => write!(f, "socket"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: RecordId,
    pub repo: String,
    /// Registry host; `docker.io` when the reference named none.
    pub registry: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
    pub display_name: String,
    pub source: Source,
    pub stack: Option<String>,
    pub compose_file: Option<String>,
    pub service: Option<String>,
    pub status: RunState,
    pub last_seen: DateTime<Utc>,
    pub last_update_check: Option<DateTime<Utc>>,
    /// `None` until a check succeeds in comparing digests.
    pub update_available: Option<bool>,
    pub update_message: Option<String>,
}

impl InventoryRecord {
    /// Rebuild the image reference this record describes.
    pub fn image_ref(&self) -> ImageRef {
        let registry = (!self.registry.eq_ignore_ascii_case(DEFAULT_REGISTRY))
            .then_some(self.registry.as_str());
        ImageRef::from_parts(
            registry,
            &self.repo,
            self.tag.as_deref(),
            self.digest.as_deref(),
        )
    }

    /// Browser link for the image's repository.
    pub fn homepage_url(&self) -> String {
        homepage_url(&self.image_ref())
    }

    /// Copy the outcome of the last update check from a previous version of
    /// this record.
    pub fn carry_check_from(&mut self, previous: &InventoryRecord) {
        self.last_update_check = previous.last_update_check;
        self.update_available = previous.update_available;
        self.update_message = previous.update_message.clone();
    }

    /// Record the outcome of an update check started at `checked_at`.
    pub fn record_check(
        &mut self,
        checked_at: DateTime<Utc>,
        update_available: Option<bool>,
        message: impl Into<String>,
    ) {
        self.last_update_check = Some(checked_at);
        self.update_available = update_available;
        self.update_message = Some(message.into());
    }
}
