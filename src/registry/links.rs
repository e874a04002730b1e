// ABOUTME: Human-facing repository links for inventory records.
// ABOUTME: Docker Hub and GHCR get their web pages; other registries their host URL.

use crate::types::ImageRef;

/// Web page for an image's repository.
pub fn homepage_url(image: &ImageRef) -> String {
    let repository = image.repository();
    if image.is_default_registry() {
        return format!("https://hub.docker.com/r/{}", hub_repository(repository));
    }
    let registry = image.registry_or_default();
    if registry.eq_ignore_ascii_case("ghcr.io") {
        return format!("https://github.com/{}", repository);
    }
    format!("https://{}/{}", registry, repository)
}

/// Docker Hub path for a repository: bare names live under `library/`.
pub fn hub_repository(repository: &str) -> String {
    if repository.contains('/') {
        repository.to_string()
    } else {
        format!("library/{}", repository)
    }
}
