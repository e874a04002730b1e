// ABOUTME: Configuration types and parsing for dockscout.yml.
// ABOUTME: Handles YAML parsing, defaults, and environment variable overrides.

mod env_value;
mod registry;

pub use env_value::EnvValue;
pub use registry::{AuthConfig, RegistryConfig};

use crate::compose::DEFAULT_SCAN_DEPTH;
use crate::error::{Error, Result};
use crate::registry::RegistryClientConfig;
use crate::runtime::RuntimeConfig;
use crate::update::CheckPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "dockscout.yml";
pub const CONFIG_FILENAME_ALT: &str = "dockscout.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dockscout/config.yml";

pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_DOCKER_SOCKET: &str = "DOCKER_SOCKET";
pub const ENV_COMPOSE_MOUNTS: &str = "COMPOSE_MOUNTS";
pub const ENV_LOCAL_REFRESH_HOURS: &str = "LOCAL_REFRESH_HOURS";
pub const ENV_UPDATE_INTERVAL_MINUTES: &str = "UPDATE_INTERVAL_MINUTES";
pub const ENV_UPDATE_BATCH_SIZE: &str = "UPDATE_BATCH_SIZE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `db.json`.
    pub data_dir: PathBuf,

    /// Directories searched for compose manifests.
    pub compose_roots: Vec<PathBuf>,

    pub scan_depth: usize,

    pub runtime: RuntimeConfig,

    /// How often `watch` rebuilds the inventory.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,

    /// How often `watch` runs a batch of update checks.
    #[serde(with = "humantime_serde")]
    pub update_interval: Duration,

    /// Records checked per batch.
    pub batch_size: usize,

    pub check_policy: CheckPolicy,

    /// Keyed by registry host.
    pub registries: HashMap<String, RegistryConfig>,

    /// Upper bound on a single registry lookup.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data"),
            compose_roots: Vec::new(),
            scan_depth: DEFAULT_SCAN_DEPTH,
            runtime: RuntimeConfig::default(),
            refresh_interval: Duration::from_secs(6 * 60 * 60),
            update_interval: Duration::from_secs(30 * 60),
            batch_size: 5,
            check_policy: CheckPolicy::default(),
            registries: HashMap::new(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Load from `explicit` if given, else discover in `dir`, else defaults.
    /// Environment overrides are applied last.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::discover(dir) {
                Ok(config) => config,
                Err(Error::ConfigNotFound(_)) => Self::default(),
                Err(e) => return Err(e),
            },
        };
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("refresh_interval", self.refresh_interval),
            ("update_interval", self.update_interval),
            ("request_timeout", self.request_timeout),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(Error::InvalidConfig(format!("{name} must be greater than zero")));
            }
        }
        if let CheckPolicy::BoundedParallel { per_host: 0 } = self.check_policy {
            return Err(Error::InvalidConfig(
                "check_policy.per_host must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the deployment environment variables on top of this config.
    ///
    /// Numeric variables that are unparsable or not positive are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = env_string(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(socket) = env_string(ENV_DOCKER_SOCKET) {
            self.runtime.socket = Some(socket);
        }
        if let Some(mounts) = env_string(ENV_COMPOSE_MOUNTS) {
            let roots = parse_list(&mounts);
            if !roots.is_empty() {
                self.compose_roots = roots.into_iter().map(PathBuf::from).collect();
            }
        }
        if let Some(interval) = env_duration(ENV_LOCAL_REFRESH_HOURS, 60.0 * 60.0) {
            self.refresh_interval = interval;
        }
        if let Some(interval) = env_duration(ENV_UPDATE_INTERVAL_MINUTES, 60.0) {
            self.update_interval = interval;
        }
        if let Some(size) = env_positive(ENV_UPDATE_BATCH_SIZE) {
            self.batch_size = (size as usize).max(1);
        }
        self
    }

    /// Settings for the registry client, with credentials resolved.
    pub fn registry_client_config(&self) -> Result<RegistryClientConfig> {
        let registries = self
            .registries
            .iter()
            .map(|(host, entry)| Ok((host.to_ascii_lowercase(), entry.resolve()?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(RegistryClientConfig {
            registries,
            request_timeout: self.request_timeout,
            ..Default::default()
        })
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_positive(name: &str) -> Option<f64> {
    let raw = env_string(name)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Some(value),
        _ => {
            tracing::warn!(variable = name, value = %raw, "ignoring invalid numeric override");
            None
        }
    }
}

/// A positive count of `unit_secs`-long units, ignored when it does not fit a `Duration`.
fn env_duration(name: &str, unit_secs: f64) -> Option<Duration> {
    let units = env_positive(name)?;
    match Duration::try_from_secs_f64(units * unit_secs) {
        Ok(interval) => Some(interval),
        Err(e) => {
            tracing::warn!(
                variable = name,
                value = units,
                error = %e,
                "ignoring out-of-range override"
            );
            None
        }
    }
}

/// Split a comma-separated list, dropping blank items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
