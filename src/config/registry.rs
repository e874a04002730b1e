// ABOUTME: Per-registry configuration entries.
// ABOUTME: Credentials may come from literals or environment variables.

use super::env_value::EnvValue;
use crate::error::Result;
use crate::registry::{RegistryAuth, RegistrySettings};
use serde::Deserialize;

/// Configuration for one registry host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    /// Contact this registry over plain HTTP.
    #[serde(default)]
    pub insecure: bool,
}

/// Credentials as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    #[default]
    Anonymous,
    Bearer {
        token: EnvValue,
    },
    Basic {
        username: EnvValue,
        password: EnvValue,
    },
}

impl RegistryConfig {
    /// Resolve credentials into client settings.
    pub fn resolve(&self) -> Result<RegistrySettings> {
        let auth = match &self.auth {
            AuthConfig::Anonymous => RegistryAuth::Anonymous,
            AuthConfig::Bearer { token } => RegistryAuth::Bearer {
                token: token.resolve()?,
            },
            AuthConfig::Basic { username, password } => RegistryAuth::Basic {
                username: username.resolve()?,
                password: password.resolve()?,
            },
        };
        Ok(RegistrySettings {
            auth,
            insecure: self.insecure,
        })
    }
}
