// ABOUTME: Config values that are either literal or read from the environment.
// ABOUTME: Used for registry credentials so secrets stay out of the config file.

use crate::error::{Error, Result};
use serde::Deserialize;

/// A credential field: `secret` or `{ env: REGISTRY_TOKEN, default: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    /// The value to use, reading the environment at call time.
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(value) => Ok(value.clone()),
            EnvValue::FromEnv { var, default } => std::env::var(var)
                .ok()
                .or_else(|| default.clone())
                .ok_or_else(|| Error::MissingEnvVar(var.clone())),
        }
    }
}
