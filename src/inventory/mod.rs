// ABOUTME: Inventory of deployed images built from compose declarations and the runtime.
// ABOUTME: Records carry update-check results forward across rebuilds.

mod builder;
mod record;

pub use builder::{build_inventory, carry_forward, container_matches};
pub use record::{InventoryRecord, Source};
