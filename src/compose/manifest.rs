// ABOUTME: Minimal structural view of a compose manifest.
// ABOUTME: Extracts service name to image mappings, skipping services without an image.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A service declared in a compose manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeService {
    /// Name of the directory holding the manifest.
    pub stack: String,
    /// Absolute path of the manifest.
    pub compose_file: PathBuf,
    /// Service key in the manifest.
    pub service: String,
    /// Declared image reference.
    pub image: String,
}

#[derive(Debug, Default, Deserialize)]
struct ComposeManifest {
    #[serde(default)]
    services: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    #[serde(default)]
    image: Option<String>,
}

/// Errors reading a single manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Stack name for a manifest: its parent directory's name.
pub fn stack_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse manifest text into services declared with an image.
///
/// Services whose entry is not a mapping or has no `image` are skipped;
/// only a document that is not YAML at all is an error.
pub fn parse_services(path: &Path, yaml: &str) -> Result<Vec<ComposeService>, ManifestError> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let manifest: ComposeManifest = serde_yaml::from_str(yaml)?;
    let stack = stack_name(path);

    let services = manifest
        .services
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| {
            let name = name.as_str()?.to_string();
            let image = serde_yaml::from_value::<ServiceEntry>(value).ok()?.image?;
            if image.trim().is_empty() {
                tracing::debug!(service = %name, "skipping service with empty image");
                return None;
            }
            Some(ComposeService {
                stack: stack.clone(),
                compose_file: path.to_path_buf(),
                service: name,
                image,
            })
        })
        .collect();

    Ok(services)
}

/// Read and parse one manifest from disk.
pub async fn load_services(path: &Path) -> Result<Vec<ComposeService>, ManifestError> {
    let yaml = tokio::fs::read_to_string(path).await?;
    parse_services(path, &yaml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_is_parent_directory() {
        assert_eq!(stack_name(Path::new("/srv/media/compose.yml")), "media");
    }

    #[test]
    fn services_without_image_are_skipped() {
        let yaml = r#"
services:
  web:
    image: nginx:1.25
  worker:
    build: .
  broken: "not a mapping"
"#;
        let services = parse_services(Path::new("/srv/app/compose.yml"), yaml).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].service, "web");
        assert_eq!(services[0].image, "nginx:1.25");
        assert_eq!(services[0].stack, "app");
    }

    #[test]
    fn declaration_order_is_preserved() {
        let yaml = "services:\n  zeta:\n    image: a\n  alpha:\n    image: b\n";
        let names: Vec<_> = parse_services(Path::new("/s/x/compose.yml"), yaml)
            .unwrap()
            .into_iter()
            .map(|s| s.service)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn missing_services_key_yields_nothing() {
        assert!(
            parse_services(Path::new("/s/x/compose.yml"), "version: '3'\n")
                .unwrap()
                .is_empty()
        );
        assert!(parse_services(Path::new("/s/x/compose.yml"), "").unwrap().is_empty());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(parse_services(Path::new("/s/x/compose.yml"), "services: [unclosed").is_err());
    }
}
