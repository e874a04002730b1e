// ABOUTME: Staleness-ordered selection of records due for a remote check.
// ABOUTME: Never-checked records come first; ties keep their stored order.

use crate::inventory::InventoryRecord;

/// Pick up to `limit` records, least recently checked first.
///
/// A missing `last_update_check` counts as the Unix epoch. The sort is stable,
/// so the result depends only on the input.
pub fn select_batch(records: &[InventoryRecord], limit: usize) -> Vec<InventoryRecord> {
    let mut ordered: Vec<&InventoryRecord> = records.iter().collect();
    ordered.sort_by_key(|record| {
        record
            .last_update_check
            .map_or(0, |checked| checked.timestamp_millis())
    });
    ordered.into_iter().take(limit).cloned().collect()
}
