// ABOUTME: Errors raised while resolving a remote digest.
// ABOUTME: Display strings become the record's update message verbatim.

/// A failed registry lookup for one image.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Manifest endpoint answered with a non-success status.
    #[error("registry {0}")]
    Status(u16),

    /// Success response without a `Docker-Content-Digest` header.
    #[error("missing digest")]
    MissingDigest,

    /// Token endpoint answered with a non-success status.
    #[error("auth {0}")]
    AuthStatus(u16),

    /// Token endpoint answered without a token.
    #[error("missing token")]
    MissingToken,

    /// Registry host is cooling down after answering 429.
    #[error("registry rate limited")]
    RateLimited,

    /// The request could not be built or sent.
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Transport(err.to_string())
    }
}
