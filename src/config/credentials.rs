// ABOUTME: The local settings file holding the DigitalOcean token.
// ABOUTME: A missing file reads as "no token"; malformed JSON is an error.

use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Provisioning API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// DigitalOcean driver flags. `None` keeps the driver default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DriverOptions {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalConfig {
    #[serde(rename = "DOToken", default)]
    token: Option<String>,

    #[serde(flatten)]
    pub driver: DriverOptions,
}

impl LocalConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no settings file at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The access token, if one is configured and non-blank.
    pub fn token(&self) -> Option<AccessToken> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
    }
}
