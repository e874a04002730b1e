// ABOUTME: Per-registry authentication settings and bearer challenge parsing.
// ABOUTME: Anonymous, static bearer token, or basic credentials exchanged for a token.

use serde::Deserialize;
use std::collections::HashMap;

/// How to authenticate against one registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegistryAuth {
    /// No credentials. Docker Hub still gets an anonymous pull token.
    #[default]
    Anonymous,
    /// Static token sent as `Authorization: Bearer`.
    Bearer { token: String },
    /// Username and password, exchanged at the registry's token realm or
    /// sent directly when the registry asks for basic auth.
    Basic { username: String, password: String },
}

/// Settings for one registry host.
#[derive(Debug, Clone, Default)]
pub struct RegistrySettings {
    pub auth: RegistryAuth,
    /// Contact the registry over plain HTTP.
    pub insecure: bool,
}

/// Body of a token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_token(self) -> Option<String> {
        self.token
            .or(self.access_token)
            .filter(|token| !token.is_empty())
    }
}

/// A parsed `WWW-Authenticate` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Challenge {
    Bearer {
        realm: String,
        service: Option<String>,
        scope: Option<String>,
    },
    Basic,
}

/// Parse a `WWW-Authenticate` header value.
///
/// Parameters are `key=value` or `key="value"` pairs separated by commas;
/// quoted values may themselves contain commas.
pub(crate) fn parse_challenge(header: &str) -> Option<Challenge> {
    let header = header.trim();
    let (scheme, rest) = header.split_once(' ').unwrap_or((header, ""));

    if scheme.eq_ignore_ascii_case("basic") {
        return Some(Challenge::Basic);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let params = parse_params(rest);
    Some(Challenge::Bearer {
        realm: params.get("realm")?.clone(),
        service: params.get("service").cloned(),
        scope: params.get("scope").cloned(),
    })
}

fn parse_params(input: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| *c == ',' || c.is_whitespace()) {
            chars.next();
        }
        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        if key.is_empty() {
            break;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut escaped = false;
            for c in chars.by_ref() {
                match (escaped, c) {
                    (false, '\\') => escaped = true,
                    (false, '"') => break,
                    _ => {
                        value.push(c);
                        escaped = false;
                    }
                }
            }
        } else {
            while let Some(c) = chars.peek() {
                if *c == ',' {
                    break;
                }
                value.push(*c);
                chars.next();
            }
        }

        params.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    params
}
