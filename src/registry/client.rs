// ABOUTME: Remote digest resolution against Docker Hub and v2 registries.
// ABOUTME: HEADs the manifest endpoint and reads Docker-Content-Digest.

use super::auth::{Challenge, RegistryAuth, RegistrySettings, TokenResponse, parse_challenge};
use super::error::RegistryError;
use super::links::hub_repository;
use crate::types::ImageRef;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{ACCEPT, HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Media type requested from manifest endpoints.
pub const MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";

const DIGEST_HEADER: &str = "docker-content-digest";

/// Outcome of a digest lookup. Exactly one of the fields is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCheck {
    pub remote_digest: Option<String>,
    pub error: Option<String>,
}

impl From<Result<String, RegistryError>> for RegistryCheck {
    fn from(result: Result<String, RegistryError>) -> Self {
        match result {
            Ok(digest) => Self {
                remote_digest: Some(digest),
                error: None,
            },
            Err(e) => Self {
                remote_digest: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Looks up the digest a registry currently publishes for a reference.
///
/// Implementations never fail: every problem is reported in
/// [`RegistryCheck::error`].
#[async_trait]
pub trait DigestResolver: Send + Sync {
    async fn resolve(&self, reference: &ImageRef) -> RegistryCheck;
}

/// Where Docker Hub lives.
#[derive(Debug, Clone)]
pub struct HubEndpoints {
    /// Base URL of the manifest API.
    pub registry_url: String,
    /// Token issuance endpoint.
    pub token_url: String,
    /// `service` parameter sent to the token endpoint.
    pub service: String,
}

impl Default for HubEndpoints {
    fn default() -> Self {
        Self {
            registry_url: "https://registry-1.docker.io".to_string(),
            token_url: "https://auth.docker.io/token".to_string(),
            service: "registry.docker.io".to_string(),
        }
    }
}

/// Settings for [`RegistryClient`].
#[derive(Debug, Clone)]
pub struct RegistryClientConfig {
    pub hub: HubEndpoints,
    /// Per-host settings, keyed by lowercase registry host.
    pub registries: HashMap<String, RegistrySettings>,
    pub request_timeout: Duration,
    /// How long a host that answered 429 is left alone.
    pub rate_limit_cooldown: Duration,
}

impl Default for RegistryClientConfig {
    fn default() -> Self {
        Self {
            hub: HubEndpoints::default(),
            registries: HashMap::new(),
            request_timeout: Duration::from_secs(15),
            rate_limit_cooldown: Duration::from_secs(60 * 60),
        }
    }
}

/// Credentials attached to a manifest request.
enum ManifestAuth<'a> {
    None,
    Bearer(String),
    Basic { username: &'a str, password: &'a str },
}

/// HTTP digest resolver. The only component talking to third-party hosts.
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryClientConfig,
    cooldowns: Mutex<HashMap<String, Instant>>,
}

impl RegistryClient {
    pub fn new(config: RegistryClientConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("dockscout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config,
            cooldowns: Mutex::new(HashMap::new()),
        })
    }

    fn settings(&self, host: &str) -> Option<&RegistrySettings> {
        self.config.registries.get(&host.to_ascii_lowercase())
    }

    fn cooling_down(&self, host: &str) -> bool {
        let mut cooldowns = self.cooldowns.lock();
        match cooldowns.get(host) {
            Some(until) if Instant::now() < *until => true,
            Some(_) => {
                cooldowns.remove(host);
                false
            }
            None => false,
        }
    }

    fn start_cooldown(&self, host: &str) {
        tracing::warn!(
            registry = host,
            cooldown_secs = self.config.rate_limit_cooldown.as_secs(),
            "registry rate limit reached, pausing checks"
        );
        self.cooldowns
            .lock()
            .insert(host.to_string(), Instant::now() + self.config.rate_limit_cooldown);
    }

    /// Resolve the remote digest for `reference`'s tag (default `latest`).
    pub async fn fetch_digest(&self, reference: &ImageRef) -> Result<String, RegistryError> {
        let registry = reference.registry_or_default().to_ascii_lowercase();
        let tag = reference.tag().unwrap_or("latest");

        if self.cooling_down(&registry) {
            return Err(RegistryError::RateLimited);
        }

        let settings = self.settings(&registry).cloned().unwrap_or_default();

        let (base_url, repository, auth) = if reference.is_default_registry() {
            let repository = hub_repository(reference.repository());
            let token = self.hub_token(&repository, &settings.auth).await?;
            (
                self.config.hub.registry_url.clone(),
                repository,
                ManifestAuth::Bearer(token),
            )
        } else {
            let scheme = if settings.insecure { "http" } else { "https" };
            let auth = match settings.auth {
                RegistryAuth::Bearer { ref token } => ManifestAuth::Bearer(token.clone()),
                _ => ManifestAuth::None,
            };
            (
                format!("{}://{}", scheme, registry),
                reference.repository().to_string(),
                auth,
            )
        };

        let url = format!(
            "{}/v2/{}/manifests/{}",
            base_url.trim_end_matches('/'),
            repository,
            tag
        );
        tracing::debug!(%url, "requesting manifest digest");

        let mut response = self.head_manifest(&url, &auth).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && let RegistryAuth::Basic {
                ref username,
                ref password,
            } = settings.auth
        {
            let retry = self
                .answer_challenge(response.headers(), &repository, username, password)
                .await?;
            if let Some(retry) = retry {
                response = self.head_manifest(&url, &retry).await?;
            }
        }

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            self.start_cooldown(&registry);
        }
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(RegistryError::MissingDigest)
    }

    async fn head_manifest(
        &self,
        url: &str,
        auth: &ManifestAuth<'_>,
    ) -> Result<Response, RegistryError> {
        let request = self.http.head(url).header(ACCEPT, MANIFEST_V2);
        let request = match auth {
            ManifestAuth::None => request,
            ManifestAuth::Bearer(token) => request.bearer_auth(token),
            ManifestAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        };
        Ok(request.send().await?)
    }

    /// Pull token for a Docker Hub repository (already `library/`-prefixed).
    async fn hub_token(&self, repository: &str, auth: &RegistryAuth) -> Result<String, RegistryError> {
        let scope = format!("repository:{}:pull", repository);
        let url = format!(
            "{}?service={}&scope={}",
            self.config.hub.token_url,
            urlencoding::encode(&self.config.hub.service),
            urlencoding::encode(&scope)
        );
        let mut request = self.http.get(&url);
        if let RegistryAuth::Basic { username, password } = auth {
            request = request.basic_auth(username, Some(password));
        }
        self.fetch_token(request).await
    }

    /// Credentials answering a 401 challenge. `None` when the challenge is
    /// not understood.
    async fn answer_challenge<'a>(
        &self,
        headers: &HeaderMap,
        repository: &str,
        username: &'a str,
        password: &'a str,
    ) -> Result<Option<ManifestAuth<'a>>, RegistryError> {
        let Some(challenge) = headers
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_challenge)
        else {
            return Ok(None);
        };

        match challenge {
            Challenge::Basic => Ok(Some(ManifestAuth::Basic { username, password })),
            Challenge::Bearer {
                realm,
                service,
                scope,
            } => {
                let scope = scope.unwrap_or_else(|| format!("repository:{}:pull", repository));
                let mut query = vec![("scope", scope)];
                if let Some(service) = service {
                    query.push(("service", service));
                }
                let request = self
                    .http
                    .get(&realm)
                    .query(&query)
                    .basic_auth(username, Some(password));
                let token = self.fetch_token(request).await?;
                Ok(Some(ManifestAuth::Bearer(token)))
            }
        }
    }

    async fn fetch_token(&self, request: reqwest::RequestBuilder) -> Result<String, RegistryError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::AuthStatus(status.as_u16()));
        }
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|_| RegistryError::MissingToken)?;
        body.into_token().ok_or(RegistryError::MissingToken)
    }
}

#[async_trait]
impl DigestResolver for RegistryClient {
    async fn resolve(&self, reference: &ImageRef) -> RegistryCheck {
        let result = self.fetch_digest(reference).await;
        if let Err(ref e) = result {
            tracing::debug!(reference = %reference, error = %e, "digest lookup failed");
        }
        result.into()
    }
}
