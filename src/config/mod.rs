// ABOUTME: Local settings, provisioning credentials and the dockdev.json project file.
// ABOUTME: Resolves well-known paths under $HOME/.dockdev.

mod credentials;
mod init;
mod project;

pub use credentials::{AccessToken, DriverOptions, LocalConfig};
pub use init::{DEFAULT_BASE_IMAGE, init_config};
pub use project::ProjectConfig;

use crate::error::{Error, Result};
use crate::types::CleanName;
use std::path::{Path, PathBuf};

pub const PROJECT_FILENAME: &str = "dockdev.json";
pub const SETTINGS_DIR: &str = ".dockdev";
pub const SETTINGS_FILENAME: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "DOCKDEV_CONFIG";

pub const MACHINE_PREFIX: &str = "dockdev-";
pub const IMAGE_REPOSITORY: &str = "dockdev/";
pub const PROXY_IMAGE: &str = "jwilder/nginx-proxy";
pub const DEFAULT_REMOTE_ROOT: &str = "/root/dockdev";
pub const DEFAULT_LOCAL_ROOT: &str = "/tmp/dockdev";

/// Where the pipeline reads credentials from and where it puts files.
#[derive(Debug, Clone)]
pub struct Settings {
    /// JSON file holding `DOToken` and driver overrides.
    pub config_path: PathBuf,
    /// Host keys of provisioned machines.
    pub known_hosts_path: PathBuf,
    /// Parent of the per-project directory on the remote machine.
    pub remote_root: String,
    /// Parent of the per-project directory for local sync runs.
    pub local_root: PathBuf,
}

impl Settings {
    /// Settings rooted at the given settings file.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let known_hosts_path = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("known_hosts");
        Self {
            config_path,
            known_hosts_path,
            remote_root: DEFAULT_REMOTE_ROOT.to_string(),
            local_root: PathBuf::from(DEFAULT_LOCAL_ROOT),
        }
    }

    /// Resolve the settings file from `$DOCKDEV_CONFIG` or `$HOME/.dockdev/config.json`.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return Ok(Self::new(path));
        }
        let home = std::env::var("HOME")
            .map_err(|_| Error::InvalidConfig("HOME is not set".to_string()))?;
        Ok(Self::new(
            Path::new(&home).join(SETTINGS_DIR).join(SETTINGS_FILENAME),
        ))
    }

    pub fn remote_root(mut self, root: impl Into<String>) -> Self {
        self.remote_root = root.into();
        self
    }

    pub fn local_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.local_root = root.into();
        self
    }

    /// Project directory on the remote machine; also the image build context.
    pub fn remote_path(&self, clean_name: &CleanName) -> String {
        format!("{}/{}", self.remote_root.trim_end_matches('/'), clean_name)
    }

    /// Destination used instead of the machine when syncing locally.
    pub fn local_path(&self, clean_name: &CleanName) -> PathBuf {
        self.local_root.join(clean_name.as_str())
    }

    pub fn load_local_config(&self) -> Result<LocalConfig> {
        LocalConfig::load(&self.config_path)
    }
}
