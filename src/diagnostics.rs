// ABOUTME: Diagnostics accumulator for non-fatal warnings during an inventory scan.
// ABOUTME: Collects skipped directories and manifests without failing the rebuild.

use std::path::{Path, PathBuf};

/// Collects non-fatal warnings during discovery and parsing.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(path = %warning.path.display(), "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Absorb warnings collected elsewhere.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }
}

/// A non-fatal warning tied to a filesystem path.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub path: PathBuf,
    pub message: String,
}

impl Warning {
    /// A directory that could not be listed.
    pub fn unreadable_directory(path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::UnreadableDirectory,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// A manifest that could not be read.
    pub fn unreadable_manifest(path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::UnreadableManifest,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// A manifest that is not valid YAML or has an unexpected shape.
    pub fn malformed_manifest(path: &Path, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MalformedManifest,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    UnreadableDirectory,
    UnreadableManifest,
    MalformedManifest,
}
