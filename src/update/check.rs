// ABOUTME: Per-record remote update check.
// ABOUTME: Compares the running digest with the registry's and records the outcome.

use crate::inventory::InventoryRecord;
use crate::registry::{DigestResolver, RegistryCheck};
use crate::types::{ImageRef, digest_hex};
use chrono::{DateTime, Utc};
use std::time::Duration;

pub const MSG_DIGEST_CHANGED: &str = "digest changed";
pub const MSG_UP_TO_DATE: &str = "up to date";
pub const MSG_LOCAL_DIGEST_MISSING: &str = "local digest missing";
pub const MSG_UNKNOWN: &str = "unknown";

/// Apply a registry lookup to a record.
///
/// `last_update_check` always becomes `started_at`, even when the lookup
/// failed, so a broken registry cannot hog every batch.
pub fn apply_check(
    record: &InventoryRecord,
    check: RegistryCheck,
    started_at: DateTime<Utc>,
) -> InventoryRecord {
    let mut updated = record.clone();

    let Some(remote) = check.remote_digest else {
        let message = check.error.unwrap_or_else(|| MSG_UNKNOWN.to_string());
        updated.record_check(started_at, None, message);
        return updated;
    };

    let local = record
        .digest
        .as_deref()
        .map(digest_hex)
        .filter(|hex| !hex.is_empty());
    let Some(local) = local else {
        updated.record_check(started_at, None, MSG_LOCAL_DIGEST_MISSING);
        return updated;
    };

    let changed = local != digest_hex(&remote);
    let message = if changed {
        MSG_DIGEST_CHANGED
    } else {
        MSG_UP_TO_DATE
    };
    updated.record_check(started_at, Some(changed), message);
    updated
}

/// Run one remote check for `record`.
///
/// A lookup exceeding `timeout` is reported like any other failure.
pub async fn check_record<R>(
    resolver: &R,
    record: &InventoryRecord,
    timeout: Duration,
) -> InventoryRecord
where
    R: DigestResolver + ?Sized,
{
    let started_at = Utc::now();
    let reference = ImageRef::parse(&record.image_ref().canonical_string());

    let check = match tokio::time::timeout(timeout, resolver.resolve(&reference)).await {
        Ok(check) => check,
        Err(_) => RegistryCheck {
            remote_digest: None,
            error: Some(format!("check timed out after {}s", timeout.as_secs())),
        },
    };

    let updated = apply_check(record, check, started_at);
    tracing::info!(
        record = %record.id,
        image = %reference,
        update_available = ?updated.update_available,
        message = updated.update_message.as_deref().unwrap_or(""),
        "update check finished"
    );
    updated
}
