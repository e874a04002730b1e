// ABOUTME: Remote registry access for update detection.
// ABOUTME: Resolves published digests with per-registry authentication.

mod auth;
mod client;
mod error;
mod links;

pub use auth::{RegistryAuth, RegistrySettings};
pub use client::{
    DigestResolver, HubEndpoints, MANIFEST_V2, RegistryCheck, RegistryClient,
    RegistryClientConfig,
};
pub use error::RegistryError;
pub use links::{homepage_url, hub_repository};
