// ABOUTME: Test support utilities.
// ABOUTME: Fake runtime and registry resolver plus record builders for integration tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dockscout::inventory::{InventoryRecord, Source};
use dockscout::registry::{DigestResolver, RegistryCheck};
use dockscout::runtime::{
    ContainerError, ContainerFilters, ContainerOps, ContainerSummary, ImageError, ImageOps,
    ImageSummary, RunState,
};
use dockscout::types::{ContainerId, ImageId, ImageRef, RecordId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("dockscout=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed point in time for deterministic records.
#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Minimal record for scheduler and merge tests.
#[allow(dead_code)]
pub fn record(id: &str, last_check: Option<DateTime<Utc>>) -> InventoryRecord {
    InventoryRecord {
        id: RecordId::new(id),
        repo: format!("myorg/{id}"),
        registry: "docker.io".to_string(),
        tag: Some("1.0".to_string()),
        digest: Some("sha256:aaaa".to_string()),
        display_name: format!("myorg/{id}"),
        source: Source::Socket,
        stack: None,
        compose_file: None,
        service: None,
        status: RunState::Running,
        last_seen: at(0),
        last_update_check: last_check,
        update_available: None,
        update_message: None,
    }
}

#[allow(dead_code)]
pub fn container(id: &str, image: &str, image_id: &str, state: &str) -> ContainerSummary {
    ContainerSummary {
        id: ContainerId::new(id),
        name: id.to_string(),
        image: image.to_string(),
        image_id: ImageId::new(image_id),
        state: state.to_string(),
    }
}

#[allow(dead_code)]
pub fn image(id: &str, tags: &[&str], digests: &[&str]) -> ImageSummary {
    ImageSummary {
        id: ImageId::new(id),
        repo_tags: tags.iter().map(|s| s.to_string()).collect(),
        repo_digests: digests.iter().map(|s| s.to_string()).collect(),
    }
}

/// In-memory runtime whose listings can be swapped between calls.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<Vec<ContainerSummary>>,
    images: Mutex<Vec<ImageSummary>>,
    fail_images: Mutex<bool>,
}

#[allow(dead_code)]
impl FakeRuntime {
    pub fn new(containers: Vec<ContainerSummary>, images: Vec<ImageSummary>) -> Self {
        Self {
            containers: Mutex::new(containers),
            images: Mutex::new(images),
            fail_images: Mutex::new(false),
        }
    }

    pub fn set(&self, containers: Vec<ContainerSummary>, images: Vec<ImageSummary>) {
        *self.containers.lock() = containers;
        *self.images.lock() = images;
    }

    pub fn fail_images(&self, fail: bool) {
        *self.fail_images.lock() = fail;
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let containers = self.containers.lock().clone();
        Ok(if filters.all {
            containers
        } else {
            containers
                .into_iter()
                .filter(|c| c.state == "running")
                .collect()
        })
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        if *self.fail_images.lock() {
            return Err(ImageError::Runtime("daemon went away".to_string()));
        }
        Ok(self.images.lock().clone())
    }
}

/// Resolver answering from a table keyed by canonical repo key.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeResolver {
    answers: Mutex<HashMap<String, RegistryCheck>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[allow(dead_code)]
impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn answer(&self, key: &str, digest: &str) {
        self.answers.lock().insert(
            key.to_string(),
            RegistryCheck {
                remote_digest: Some(digest.to_string()),
                error: None,
            },
        );
    }

    pub fn fail(&self, key: &str, error: &str) {
        self.answers.lock().insert(
            key.to_string(),
            RegistryCheck {
                remote_digest: None,
                error: Some(error.to_string()),
            },
        );
    }

    /// Canonical strings of every reference resolved, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DigestResolver for FakeResolver {
    async fn resolve(&self, reference: &ImageRef) -> RegistryCheck {
        self.calls.lock().push(reference.canonical_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.answers
            .lock()
            .get(&reference.canonical_key())
            .cloned()
            .unwrap_or(RegistryCheck {
                remote_digest: None,
                error: Some("registry 404".to_string()),
            })
    }
}
