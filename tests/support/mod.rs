// ABOUTME: Test support utilities.
// ABOUTME: In-memory provisioning, runtime and sync doubles plus project fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use dockdev::config::{AccessToken, DriverOptions, Settings, init_config};
use dockdev::machine::{MachineError, MachineInfo, MachineOps};
use dockdev::runtime::{
    ContainerConfig, ContainerError, ContainerOps, ImageError, ImageOps, NetworkError, NetworkOps,
};
use dockdev::ssh::CommandOutput;
use dockdev::sync::{FileSync, SyncArgs, SyncError};
use dockdev::types::ContainerId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

pub const MACHINE_IP: &str = "203.0.113.10";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive(
            "dockdev=debug"
                .parse()
                .expect("static directive should parse"),
        );
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Fixtures
// =============================================================================

/// A project directory with a freshly initialized dockdev.json.
pub fn project(name: &str, base_image: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    init_config(dir.path(), Some(name), Some(base_image), false).unwrap();
    dir
}

/// Settings whose config file holds `DOToken`, rooted in a fresh directory.
pub fn settings_with_token(home: &Path) -> Settings {
    let path = home.join("config.json");
    std::fs::write(&path, r#"{"DOToken": "do-secret-token", "region": "nyc3"}"#).unwrap();
    Settings::new(path).local_root(home.join("local"))
}

/// Settings pointing at a config file that does not exist.
pub fn settings_without_token(home: &Path) -> Settings {
    Settings::new(home.join("missing.json"))
}

// =============================================================================
// MachineOps
// =============================================================================

#[derive(Default)]
pub struct FakeMachines {
    calls: Mutex<Vec<String>>,
    known: Mutex<HashSet<String>>,
    build_exit_code: u32,
    fail_create: bool,
}

impl FakeMachines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `name` was provisioned by an earlier run.
    pub fn with_machine(self, name: &str) -> Self {
        self.known.lock().insert(name.to_string());
        self
    }

    pub fn failing_builds(mut self) -> Self {
        self.build_exit_code = 1;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn creates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("create "))
            .collect()
    }
}

#[async_trait]
impl MachineOps for FakeMachines {
    async fn create_machine(
        &self,
        name: &str,
        token: &AccessToken,
        driver: &DriverOptions,
    ) -> Result<(), MachineError> {
        self.calls.lock().push(format!(
            "create {} token={} region={}",
            name,
            token.expose(),
            driver.region.as_deref().unwrap_or("-")
        ));
        if self.fail_create {
            return Err(MachineError::CommandFailed {
                command: format!("docker-machine create {}", name),
                code: Some(1),
                stderr: "quota exceeded".to_string(),
            });
        }
        self.known.lock().insert(name.to_string());
        Ok(())
    }

    async fn inspect(&self, name: &str) -> Result<MachineInfo, MachineError> {
        self.calls.lock().push(format!("inspect {}", name));
        if !self.known.lock().contains(name) {
            return Err(MachineError::CommandFailed {
                command: format!("docker-machine inspect {}", name),
                code: Some(1),
                stderr: format!("Host does not exist: \"{}\"", name),
            });
        }
        Ok(MachineInfo {
            name: name.to_string(),
            ip_address: MACHINE_IP.to_string(),
            ssh_user: "root".to_string(),
            ssh_port: 22,
            ssh_key_path: PathBuf::from(format!("/machines/{}/id_rsa", name)),
        })
    }

    async fn ssh(&self, name: &str, command: &str) -> Result<CommandOutput, MachineError> {
        self.calls.lock().push(format!("ssh {}: {}", name, command));
        Ok(CommandOutput {
            exit_code: self.build_exit_code,
            stdout: String::new(),
            stderr: if self.build_exit_code == 0 {
                String::new()
            } else {
                "npm ERR! missing script: start".to_string()
            },
        })
    }
}

// =============================================================================
// ContainerRuntime
// =============================================================================

#[derive(Default)]
pub struct FakeRuntime {
    networks: Mutex<Vec<(String, String)>>,
    images: Mutex<HashSet<String>>,
    pulls: Mutex<Vec<String>>,
    created: Mutex<Vec<(String, ContainerConfig)>>,
    started: Mutex<Vec<ContainerId>>,
    network_exists: bool,
    fail_create_for: Option<String>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, image: &str) -> Self {
        self.images.lock().insert(image.to_string());
        self
    }

    pub fn with_existing_network(mut self) -> Self {
        self.network_exists = true;
        self
    }

    pub fn failing_create_for(mut self, name: &str) -> Self {
        self.fail_create_for = Some(name.to_string());
        self
    }

    pub fn networks(&self) -> Vec<(String, String)> {
        self.networks.lock().clone()
    }

    pub fn pulls(&self) -> Vec<String> {
        self.pulls.lock().clone()
    }

    pub fn created(&self) -> Vec<(String, ContainerConfig)> {
        self.created.lock().clone()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created().into_iter().map(|(_, c)| c.name).collect()
    }

    pub fn started(&self) -> Vec<ContainerId> {
        self.started.lock().clone()
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(
        &self,
        machine: &str,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        if self.fail_create_for.as_deref() == Some(config.name.as_str()) {
            return Err(ContainerError::Runtime(format!(
                "Conflict. The container name \"/{}\" is already in use",
                config.name
            )));
        }
        let mut created = self.created.lock();
        created.push((machine.to_string(), config.clone()));
        Ok(ContainerId::new(format!("c{:03}{}", created.len(), config.name)))
    }

    async fn start_container(&self, _machine: &str, id: &ContainerId) -> Result<(), ContainerError> {
        self.started.lock().push(id.clone());
        Ok(())
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn image_exists(&self, _machine: &str, image: &str) -> Result<bool, ImageError> {
        Ok(self.images.lock().contains(image))
    }

    async fn pull_image(&self, _machine: &str, image: &str) -> Result<(), ImageError> {
        self.pulls.lock().push(image.to_string());
        self.images.lock().insert(image.to_string());
        Ok(())
    }
}

#[async_trait]
impl NetworkOps for FakeRuntime {
    async fn create_network(&self, machine: &str, name: &str) -> Result<String, NetworkError> {
        self.networks
            .lock()
            .push((machine.to_string(), name.to_string()));
        if self.network_exists {
            return Err(NetworkError::AlreadyExists(name.to_string()));
        }
        Ok(format!("net-{}", name))
    }
}

// =============================================================================
// FileSync
// =============================================================================

#[derive(Default)]
pub struct FakeSync {
    calls: Mutex<Vec<SyncArgs>>,
    fail: bool,
}

impl FakeSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SyncArgs> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FileSync for FakeSync {
    async fn sync(&self, args: &SyncArgs) -> Result<(), SyncError> {
        self.calls.lock().push(args.clone());
        if self.fail {
            return Err(SyncError::Failed {
                program: "rsync".to_string(),
                code: Some(255),
                stderr: "Connection refused".to_string(),
            });
        }
        Ok(())
    }
}
