// ABOUTME: DNS-label-safe project identifier.
// ABOUTME: Names the remote machine, the private network and the image repository.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleanNameError {
    #[error("project name cannot be empty")]
    Empty,

    #[error("project name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("project name cannot start or end with a hyphen")]
    EdgeHyphen,

    #[error("invalid character in project name: '{0}'")]
    InvalidChar(char),
}

/// Project identifier usable as a file name, a DNS label and a docker network name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CleanName(String);

impl CleanName {
    pub fn new(value: &str) -> Result<Self, CleanNameError> {
        if value.is_empty() {
            return Err(CleanNameError::Empty);
        }
        if value.len() > MAX_LEN {
            return Err(CleanNameError::TooLong);
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(CleanNameError::EdgeHyphen);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(CleanNameError::InvalidChar(c));
        }
        Ok(Self(value.to_string()))
    }

    /// Derive a clean name from a free-form project name.
    ///
    /// Letters are lowercased, every run of other characters becomes a single
    /// hyphen, and the result is trimmed to a valid label.
    pub fn from_project_name(name: &str) -> Result<Self, CleanNameError> {
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
            } else if !out.ends_with('-') {
                out.push('-');
            }
        }
        let trimmed: String = out.trim_matches('-').chars().take(MAX_LEN).collect();
        Self::new(trimmed.trim_end_matches('-'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CleanName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CleanName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        CleanName::new(&s).map_err(serde::de::Error::custom)
    }
}
