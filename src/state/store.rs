// ABOUTME: JSON file persistence for the inventory snapshot.
// ABOUTME: Missing file means empty state; writes go through a temp file and rename.

use crate::inventory::InventoryRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the snapshot inside the data directory.
pub const STATE_FILENAME: &str = "db.json";

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    #[serde(default)]
    pub images: Vec<InventoryRecord>,
    #[serde(default)]
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Errors loading or saving state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save access to the snapshot file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/db.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STATE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<StateSnapshot, StateError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no state file yet, starting empty");
                return Ok(StateSnapshot::default());
            }
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| StateError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the snapshot atomically: a failed save leaves the old file intact.
    pub async fn save(&self, snapshot: &StateSnapshot) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        tracing::debug!(
            path = %self.path.display(),
            records = snapshot.images.len(),
            "state saved"
        );
        Ok(())
    }
}
