// ABOUTME: Shared in-memory state with a single serialized writer.
// ABOUTME: Readers get the last published snapshot; writers save before publishing.

use super::store::{StateError, StateSnapshot, StateStore};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The engine's view of persisted state.
///
/// Mutations run one at a time. Each computes a new snapshot from the latest
/// published one, saves it, and only then publishes it, so readers never see
/// unsaved or partial state.
pub struct StateHandle {
    store: StateStore,
    current: RwLock<Arc<StateSnapshot>>,
    writer: Mutex<()>,
}

impl StateHandle {
    /// Load state from `store`.
    pub async fn open(store: StateStore) -> Result<Self, StateError> {
        let initial = store.load().await?;
        Ok(Self::with_snapshot(store, initial))
    }

    /// Start from an already-loaded snapshot.
    pub fn with_snapshot(store: StateStore, snapshot: StateSnapshot) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.current.read().clone()
    }

    /// Replace the snapshot with `apply(latest)`.
    ///
    /// If `apply` fails or the save fails, nothing is published and the file
    /// on disk is unchanged.
    pub async fn mutate<F, E>(&self, apply: F) -> Result<Arc<StateSnapshot>, E>
    where
        F: FnOnce(&StateSnapshot) -> Result<StateSnapshot, E>,
        E: From<StateError>,
    {
        let _writer = self.writer.lock().await;
        let latest = self.snapshot();
        let next = Arc::new(apply(&latest)?);
        self.store.save(&next).await?;
        *self.current.write() = next.clone();
        Ok(next)
    }
}
