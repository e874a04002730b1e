// ABOUTME: Orchestrates inventory rebuilds and remote update checks.
// ABOUTME: Every operation returns the full persisted snapshot afterward.

use crate::compose;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::inventory::{InventoryRecord, build_inventory, carry_forward};
use crate::registry::DigestResolver;
use crate::runtime::{InventoryRuntime, RuntimeSnapshot};
use crate::state::{StateHandle, StateSnapshot};
use crate::types::RecordId;
use crate::update::{CheckPolicy, merge_updates, run_checks, select_batch};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Knobs the engine needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub compose_roots: Vec<PathBuf>,
    pub scan_depth: usize,
    pub check_policy: CheckPolicy,
    /// Upper bound on one registry lookup.
    pub check_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            compose_roots: Vec::new(),
            scan_depth: compose::DEFAULT_SCAN_DEPTH,
            check_policy: CheckPolicy::default(),
            check_timeout: Duration::from_secs(30),
        }
    }
}

/// Inventory and update-detection engine.
///
/// Runtime queries and registry lookups run without holding any lock. Writes
/// to state go through the [`StateHandle`] one at a time and are applied to
/// the latest snapshot, so concurrent operations never overwrite each other
/// with stale data.
pub struct Engine {
    runtime: Arc<dyn InventoryRuntime>,
    resolver: Arc<dyn DigestResolver>,
    state: StateHandle,
    settings: EngineSettings,
    last_diagnostics: Mutex<Diagnostics>,
}

impl Engine {
    pub fn new(
        runtime: Arc<dyn InventoryRuntime>,
        resolver: Arc<dyn DigestResolver>,
        state: StateHandle,
        settings: EngineSettings,
    ) -> Self {
        Self {
            runtime,
            resolver,
            state,
            settings,
            last_diagnostics: Mutex::new(Diagnostics::default()),
        }
    }

    /// Current persisted snapshot.
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot().as_ref().clone()
    }

    /// Warnings from the most recent rebuild's manifest scan.
    pub fn last_diagnostics(&self) -> Diagnostics {
        self.last_diagnostics.lock().clone()
    }

    /// Re-scan manifests and the runtime and replace the stored records.
    ///
    /// Records keep their last check results when their id survives. A
    /// runtime failure aborts the rebuild and leaves state untouched.
    pub async fn rebuild_inventory(&self) -> Result<StateSnapshot> {
        let (scan, runtime) = tokio::join!(
            compose::scan(self.settings.compose_roots.clone(), self.settings.scan_depth),
            RuntimeSnapshot::capture(self.runtime.as_ref()),
        );
        let runtime = runtime?;

        let now = Utc::now();
        let fresh = build_inventory(&runtime, &scan.services, now);
        tracing::info!(
            manifests = scan.manifests.len(),
            services = scan.services.len(),
            containers = runtime.containers.len(),
            records = fresh.len(),
            warnings = scan.diagnostics.warnings().len(),
            "inventory rebuilt"
        );
        *self.last_diagnostics.lock() = scan.diagnostics;

        let saved = self
            .state
            .mutate(|latest| {
                Ok::<_, Error>(StateSnapshot {
                    images: carry_forward(fresh, &latest.images),
                    last_refresh: Some(now),
                })
            })
            .await?;
        Ok(saved.as_ref().clone())
    }

    /// Check up to `limit` of the least recently checked records.
    pub async fn check_batch(&self, limit: usize) -> Result<StateSnapshot> {
        let current = self.state.snapshot();
        let batch = select_batch(&current.images, limit);
        self.check_and_merge(batch).await
    }

    /// Check the records with the given ids. Unknown ids are ignored.
    pub async fn check_by_ids(&self, ids: &[RecordId]) -> Result<StateSnapshot> {
        let wanted: HashSet<&RecordId> = ids.iter().collect();
        let current = self.state.snapshot();
        let targets = current
            .images
            .iter()
            .filter(|record| wanted.contains(&record.id))
            .cloned()
            .collect();
        self.check_and_merge(targets).await
    }

    /// Check every record belonging to compose stack `stack`.
    pub async fn check_by_stack(&self, stack: &str) -> Result<StateSnapshot> {
        let stack = stack.trim();
        if stack.is_empty() {
            return Err(Error::InvalidRequest("stack name must not be empty".to_string()));
        }
        let current = self.state.snapshot();
        let targets = current
            .images
            .iter()
            .filter(|record| record.stack.as_deref() == Some(stack))
            .cloned()
            .collect();
        self.check_and_merge(targets).await
    }

    async fn check_and_merge(&self, targets: Vec<InventoryRecord>) -> Result<StateSnapshot> {
        if targets.is_empty() {
            tracing::debug!("no records to check");
            return Ok(self.snapshot());
        }

        let updates = run_checks(
            self.resolver.as_ref(),
            &targets,
            self.settings.check_policy,
            self.settings.check_timeout,
        )
        .await;

        let saved = self
            .state
            .mutate(|latest| {
                Ok::<_, Error>(StateSnapshot {
                    images: merge_updates(&latest.images, &updates),
                    last_refresh: latest.last_refresh,
                })
            })
            .await?;

        tracing::info!(checked = updates.len(), "update checks merged");
        Ok(saved.as_ref().clone())
    }
}
