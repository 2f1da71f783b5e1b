// ABOUTME: Machine connection metadata parsed from `docker-machine inspect`.
// ABOUTME: Only the driver fields needed for SSH and routing are kept.

use super::MachineError;
use serde::Deserialize;
use std::path::PathBuf;

/// Where a provisioned machine lives and how to log in to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub name: String,
    pub ip_address: String,
    pub ssh_user: String,
    pub ssh_port: u16,
    pub ssh_key_path: PathBuf,
}

impl MachineInfo {
    /// `user@ip`, the form rsync and ssh expect.
    pub fn ssh_target(&self) -> String {
        format!("{}@{}", self.ssh_user, self.ip_address)
    }

    pub fn from_inspect_json(machine: &str, json: &str) -> Result<Self, MachineError> {
        let invalid = |reason: String| MachineError::InvalidInspect {
            machine: machine.to_string(),
            reason,
        };

        let raw: RawInspect = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
        let driver = raw.driver;
        if driver.ip_address.is_empty() {
            return Err(invalid("machine has no IP address".to_string()));
        }

        Ok(Self {
            name: raw.name.unwrap_or_else(|| machine.to_string()),
            ip_address: driver.ip_address,
            ssh_user: driver.ssh_user.unwrap_or_else(|| "root".to_string()),
            ssh_port: driver.ssh_port.unwrap_or(22),
            ssh_key_path: driver
                .ssh_key_path
                .ok_or_else(|| invalid("missing SSHKeyPath".to_string()))?,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawInspect {
    name: Option<String>,
    driver: RawDriver,
}

#[derive(Deserialize)]
struct RawDriver {
    #[serde(rename = "IPAddress", default)]
    ip_address: String,
    #[serde(rename = "SSHUser")]
    ssh_user: Option<String>,
    #[serde(rename = "SSHPort")]
    ssh_port: Option<u16>,
    #[serde(rename = "SSHKeyPath")]
    ssh_key_path: Option<PathBuf>,
}
