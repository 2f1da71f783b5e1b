// ABOUTME: The dockdev.json project file.
// ABOUTME: Persists the container list and build counter between deployments.

use super::PROJECT_FILENAME;
use crate::deploy::{Container, DeploymentRecord};
use crate::error::{Error, Result};
use crate::types::CleanName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub project_name: String,
    pub clean_name: CleanName,
    /// Base image of the server's Dockerfile. Survives the server entry
    /// being replaced by the built image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,
    #[serde(default)]
    pub counter: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl ProjectConfig {
    pub fn new(project_name: impl Into<String>, clean_name: CleanName) -> Self {
        Self {
            project_name: project_name.into(),
            clean_name,
            base_image: None,
            counter: 0,
            machine: None,
            containers: Vec::new(),
        }
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(PROJECT_FILENAME)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path(dir);
        if !path.exists() {
            return Err(Error::ConfigNotFound(dir.to_path_buf()));
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    /// Nearest directory at or above `start` holding a dockdev.json.
    pub fn discover(start: &Path) -> Result<PathBuf> {
        start
            .ancestors()
            .find(|dir| Self::path(dir).is_file())
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::ConfigNotFound(start.to_path_buf()))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(Self::path(dir), json)?;
        Ok(())
    }

    /// Take over the state a finished deployment produced.
    pub fn apply_record(&mut self, record: &DeploymentRecord) {
        self.counter = record.counter;
        self.machine = Some(record.machine.clone());
        self.containers = record.containers.clone();
    }
}
