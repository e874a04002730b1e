// ABOUTME: Persisted inventory state and its single-writer handle.
// ABOUTME: JSON snapshot of records plus the last refresh time.

mod handle;
mod store;

pub use handle::StateHandle;
pub use store::{STATE_FILENAME, StateError, StateSnapshot, StateStore};
