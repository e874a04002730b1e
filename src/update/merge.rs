// ABOUTME: Merges freshly checked records back into the stored record set.
// ABOUTME: Keyed by record id; only the check outcome fields are taken from an update.

use crate::inventory::InventoryRecord;
use crate::types::RecordId;
use std::collections::HashMap;

/// Copy check results from `updates` onto the stored records with the same id.
///
/// Only `last_update_check`, `update_available` and `update_message` move; the
/// rest of the stored record wins, since a rebuild may have refreshed it while
/// the check was in flight. Order is preserved and updates whose id is no
/// longer stored are dropped.
pub fn merge_updates(
    records: &[InventoryRecord],
    updates: &[InventoryRecord],
) -> Vec<InventoryRecord> {
    let by_id: HashMap<&RecordId, &InventoryRecord> =
        updates.iter().map(|update| (&update.id, update)).collect();

    records
        .iter()
        .map(|record| {
            let mut merged = record.clone();
            if let Some(update) = by_id.get(&record.id) {
                merged.carry_check_from(update);
            }
            merged
        })
        .collect()
}
