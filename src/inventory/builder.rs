// ABOUTME: Reconciles a runtime snapshot with compose declarations into inventory records.
// ABOUTME: One record per declared service plus one per group of undeclared containers.

use super::record::{InventoryRecord, Source};
use crate::compose::ComposeService;
use crate::runtime::{ContainerSnapshot, RunState, RuntimeSnapshot};
use crate::types::{ContainerId, ImageRef, RecordId, digest_hex};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Whether `container` runs the image a compose service declares.
///
/// Repositories must agree on their canonical key. A declared tag must equal
/// the container's tag, and a container without a resolvable tag never
/// matches a tagged declaration. A declared digest must share a suffix with
/// the container's digest in either direction.
///
/// The suffix test tolerates differing algorithm prefixes but can also accept
/// an unrelated digest that happens to end with a very short declared hash.
pub fn container_matches(
    declared: &ImageRef,
    container: &ContainerSnapshot,
    snapshot: &RuntimeSnapshot,
) -> bool {
    let running = snapshot.image_ref_for(container);
    let declared_key = declared.canonical_key();

    if declared_key != running.canonical_key() {
        return false;
    }

    if let Some(tag) = declared.tag() {
        match running.tag() {
            Some(running_tag) if running_tag == tag => {}
            _ => return false,
        }
    }

    if let Some(declared_digest) = declared.digest() {
        let Some(running_digest) = snapshot.image_digest(&container.image_id, Some(&declared_key))
        else {
            return false;
        };
        let declared_hex = digest_hex(declared_digest);
        let running_hex = digest_hex(&running_digest);
        if declared_hex.is_empty() || running_hex.is_empty() {
            return false;
        }
        if !running_hex.ends_with(declared_hex) && !declared_hex.ends_with(running_hex) {
            return false;
        }
    }

    true
}

/// Build the full record set for one snapshot and all declared services.
///
/// Update-check fields start empty; use [`carry_forward`] to restore them
/// from the previously persisted records.
pub fn build_inventory(
    snapshot: &RuntimeSnapshot,
    services: &[ComposeService],
    now: DateTime<Utc>,
) -> Vec<InventoryRecord> {
    let mut consumed: HashSet<&ContainerId> = HashSet::new();
    let mut records = Vec::with_capacity(services.len());

    for service in services {
        let declared = ImageRef::parse(&service.image);
        let repo_key = declared.canonical_key();

        let matches: Vec<&ContainerSnapshot> = snapshot
            .containers
            .iter()
            .filter(|container| container_matches(&declared, container, snapshot))
            .collect();
        consumed.extend(matches.iter().copied().map(|container| &container.id));

        let digest = matches
            .first()
            .and_then(|container| snapshot.image_digest(&container.image_id, Some(&repo_key)))
            .or_else(|| declared.digest().map(str::to_string));

        records.push(InventoryRecord {
            id: RecordId::compose(
                &repo_key,
                declared.tag(),
                digest.as_deref(),
                Some(service.stack.as_str()),
                Some(service.service.as_str()),
            ),
            repo: declared.repository().to_string(),
            registry: declared.registry_or_default().to_string(),
            tag: declared.tag().map(str::to_string),
            digest,
            display_name: declared.display_name(),
            source: Source::Compose,
            stack: Some(service.stack.clone()),
            compose_file: Some(service.compose_file.display().to_string()),
            service: Some(service.service.clone()),
            status: RunState::aggregate(matches.iter().map(|container| &container.state)),
            last_seen: now,
            last_update_check: None,
            update_available: None,
            update_message: None,
        });
    }

    // Group leftovers by image identity, keeping first-seen order.
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(ImageRef, Vec<&ContainerSnapshot>)> = Vec::new();
    for container in &snapshot.containers {
        if consumed.contains(&container.id) {
            continue;
        }
        let reference = snapshot.image_ref_for(container);
        let key = format!(
            "{}|{}|{}",
            reference.canonical_key(),
            reference.tag().unwrap_or(""),
            reference.digest().unwrap_or("")
        );
        match group_index.get(&key) {
            Some(&index) => groups[index].1.push(container),
            None => {
                group_index.insert(key, groups.len());
                groups.push((reference, vec![container]));
            }
        }
    }

    for (reference, containers) in groups {
        let repo_key = reference.canonical_key();
        let digest = snapshot.image_digest(&containers[0].image_id, Some(&repo_key));
        records.push(InventoryRecord {
            id: RecordId::compose(&repo_key, reference.tag(), digest.as_deref(), None, None),
            repo: reference.repository().to_string(),
            registry: reference.registry_or_default().to_string(),
            tag: reference.tag().map(str::to_string),
            digest,
            display_name: reference.display_name(),
            source: Source::Socket,
            stack: None,
            compose_file: None,
            service: None,
            status: RunState::aggregate(containers.iter().map(|container| &container.state)),
            last_seen: now,
            last_update_check: None,
            update_available: None,
            update_message: None,
        });
    }

    dedupe_by_id(records)
}

/// Keep the first record for each id.
fn dedupe_by_id(records: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(record.id.clone());
            if !fresh {
                tracing::debug!(record = %record.id, "dropping duplicate inventory record");
            }
            fresh
        })
        .collect()
}

/// Restore update-check results from `previous` onto records whose id survived.
pub fn carry_forward(
    mut fresh: Vec<InventoryRecord>,
    previous: &[InventoryRecord],
) -> Vec<InventoryRecord> {
    let by_id: HashMap<&RecordId, &InventoryRecord> =
        previous.iter().map(|record| (&record.id, record)).collect();
    for record in &mut fresh {
        if let Some(old) = by_id.get(&record.id) {
            record.carry_check_from(old);
        }
    }
    fresh
}
