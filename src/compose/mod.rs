// ABOUTME: Compose manifest discovery and service extraction.
// ABOUTME: Produces ComposeService declarations for the inventory builder.

mod discovery;
mod manifest;

pub use discovery::{DEFAULT_SCAN_DEPTH, MANIFEST_NAMES, find_manifests};
pub use manifest::{ComposeService, ManifestError, load_services, parse_services, stack_name};

use crate::diagnostics::{Diagnostics, Warning};
use futures::future::join_all;
use std::path::PathBuf;

/// Result of scanning all compose roots.
#[derive(Debug, Default)]
pub struct ComposeScan {
    pub manifests: Vec<PathBuf>,
    pub services: Vec<ComposeService>,
    pub diagnostics: Diagnostics,
}

/// Discover manifests under `roots` and load every declared service.
///
/// Manifests are read concurrently. Unreadable or malformed ones are skipped
/// and reported through the scan's diagnostics.
pub async fn scan(roots: Vec<PathBuf>, max_depth: usize) -> ComposeScan {
    let walk = tokio::task::spawn_blocking(move || {
        let mut diagnostics = Diagnostics::default();
        let manifests = find_manifests(&roots, max_depth, &mut diagnostics);
        (manifests, diagnostics)
    })
    .await;

    let (manifests, mut diagnostics) = match walk {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("manifest discovery task failed: {}", e);
            return ComposeScan::default();
        }
    };

    let loaded = join_all(manifests.iter().map(|path| load_services(path))).await;

    let mut services = Vec::new();
    for (path, result) in manifests.iter().zip(loaded) {
        match result {
            Ok(found) => services.extend(found),
            Err(ManifestError::Io(e)) => {
                diagnostics.warn(Warning::unreadable_manifest(path, e.to_string()))
            }
            Err(ManifestError::Yaml(e)) => {
                diagnostics.warn(Warning::malformed_manifest(path, e.to_string()))
            }
        }
    }

    tracing::debug!(
        manifests = manifests.len(),
        services = services.len(),
        "compose scan complete"
    );

    ComposeScan {
        manifests,
        services,
        diagnostics,
    }
}
