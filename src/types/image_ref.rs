// ABOUTME: Container image reference normalization.
// ABOUTME: Parses nginx, host:5000/org/app:tag@digest into parts and a canonical repo key.

use std::fmt;

/// Registry assumed when a reference names no explicit host.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// A parsed image reference.
///
/// Parsing never fails: fields that cannot be found are `None`. When nothing
/// usable is left for the repository (`host/`, `:tag`, `@sha256:...`) it falls
/// back to the name before the tag, or to the whole trimmed input when that is
/// empty too. An absent tag is left absent; callers that need one substitute
/// `latest` themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        // Split off digest if present
        let (without_digest, digest) = match input.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        // A colon is a tag separator only after the last slash, otherwise it
        // belongs to a registry port (host:5000/app)
        let (without_tag, tag) = match without_digest.rsplit_once(':') {
            Some((before, after)) if !after.contains('/') => (before, Some(after.to_string())),
            _ => (without_digest, None),
        };

        let (registry, repository) = match Self::split_registry(without_tag) {
            (_, repository) if repository.is_empty() => {
                let fallback = if without_tag.is_empty() { input } else { without_tag };
                (None, fallback.to_string())
            }
            parts => parts,
        };

        Self {
            registry,
            repository,
            tag,
            digest,
        }
    }

    /// The first path segment names a registry only when it looks like a host.
    fn split_registry(name: &str) -> (Option<String>, String) {
        match name.split_once('/') {
            Some((first, rest))
                if !first.is_empty() && (first.contains('.') || first.contains(':')) =>
            {
                (Some(first.to_string()), rest.to_string())
            }
            _ => (None, name.to_string()),
        }
    }

    /// Build a reference from already-separated parts.
    pub fn from_parts(
        registry: Option<&str>,
        repository: &str,
        tag: Option<&str>,
        digest: Option<&str>,
    ) -> Self {
        Self {
            registry: registry.map(str::to_string),
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
            digest: digest.map(str::to_string),
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Explicit registry, or the default public registry.
    pub fn registry_or_default(&self) -> &str {
        self.registry.as_deref().unwrap_or(DEFAULT_REGISTRY)
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Whether this reference resolves against the default public registry.
    pub fn is_default_registry(&self) -> bool {
        self.registry_or_default().eq_ignore_ascii_case(DEFAULT_REGISTRY)
    }

    /// Lowercase `registry/repository`, the join key across data sources.
    pub fn canonical_key(&self) -> String {
        format!("{}/{}", self.registry_or_default(), self.repository).to_lowercase()
    }

    /// Re-serialized form; parsing it yields an equal reference.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }

    /// Registry and repository without tag or digest, as shown to users.
    pub fn display_name(&self) -> String {
        match self.registry {
            Some(ref registry) => format!("{}/{}", registry, self.repository),
            None => self.repository.clone(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.repository)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

/// Content-hash portion of a digest.
///
/// Accepts bare hashes, `sha256:<hex>` and runtime repo digests such as
/// `nginx@sha256:<hex>`.
pub fn digest_hex(digest: &str) -> &str {
    let digest = digest.rsplit_once('@').map_or(digest, |(_, d)| d);
    digest.split_once(':').map_or(digest, |(_, hex)| hex)
}

/// Abbreviated digest for display: `abcde...vwxyz`.
pub fn short_digest(digest: Option<&str>) -> String {
    let Some(digest) = digest else {
        return String::new();
    };
    let hex = digest_hex(digest);
    if hex.chars().count() <= 12 {
        return hex.to_string();
    }
    let head: String = hex.chars().take(5).collect();
    let tail: String = hex
        .chars()
        .rev()
        .take(5)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", head, tail)
}
