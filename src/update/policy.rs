// ABOUTME: How a set of update checks is executed against registries.
// ABOUTME: Strictly sequential, or concurrent with a per-registry in-flight cap.

use super::check::check_record;
use crate::inventory::InventoryRecord;
use crate::registry::DigestResolver;
use futures::future::join_all;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Execution strategy for a batch of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CheckPolicy {
    /// One registry request at a time, in selection order.
    #[default]
    Sequential,
    /// All checks at once, at most `per_host` in flight per registry host.
    BoundedParallel { per_host: usize },
}

/// Check every record under `policy`. Results keep the input order.
pub async fn run_checks<R>(
    resolver: &R,
    records: &[InventoryRecord],
    policy: CheckPolicy,
    timeout: Duration,
) -> Vec<InventoryRecord>
where
    R: DigestResolver + ?Sized,
{
    match policy {
        CheckPolicy::Sequential => {
            let mut updated = Vec::with_capacity(records.len());
            for record in records {
                updated.push(check_record(resolver, record, timeout).await);
            }
            updated
        }
        CheckPolicy::BoundedParallel { per_host } => {
            let per_host = per_host.max(1);
            let mut limits: HashMap<String, Arc<Semaphore>> = HashMap::new();
            let checks = records.iter().map(|record| {
                let host = record.registry.to_ascii_lowercase();
                let limit = limits
                    .entry(host)
                    .or_insert_with(|| Arc::new(Semaphore::new(per_host)))
                    .clone();
                async move {
                    // The semaphore is never closed, so acquire cannot fail.
                    let _permit = limit.acquire_owned().await.ok();
                    check_record(resolver, record, timeout).await
                }
            });
            let checks: Vec<_> = checks.collect();
            join_all(checks).await
        }
    }
}
