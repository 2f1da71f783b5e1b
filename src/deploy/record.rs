// ABOUTME: The deployment record threaded through every pipeline step.
// ABOUTME: Also the per-role container entries it carries.

use super::error::{DeployError, DeployErrorKind};
use crate::config::{IMAGE_REPOSITORY, MACHINE_PREFIX, ProjectConfig};
use crate::types::{CleanName, ContainerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Per-container lifecycle marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    #[default]
    Pending,
    Created,
    Running,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerStatus::Pending => f.write_str("pending"),
            ContainerStatus::Created => f.write_str("created"),
            ContainerStatus::Running => f.write_str("running"),
        }
    }
}

/// What a container is for. Decides the shape of its runtime config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Proxy,
    /// Databases and other auxiliary services.
    Service,
}

/// One container of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub clean_name: CleanName,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_id: Option<ContainerId>,
    pub name: String,
    #[serde(default)]
    pub server: bool,
    #[serde(default)]
    pub nginx: bool,
    #[serde(default)]
    pub status: ContainerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
}

impl Container {
    /// Application server built from `base_image`.
    pub fn server(clean_name: CleanName, base_image: impl Into<String>) -> Self {
        Self {
            clean_name,
            image: base_image.into(),
            docker_id: None,
            name: "server".to_string(),
            server: true,
            nginx: false,
            status: ContainerStatus::Pending,
            machine: None,
        }
    }

    /// Database or other auxiliary service running a published image.
    pub fn service(clean_name: CleanName, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            clean_name,
            image: image.into(),
            docker_id: None,
            name: name.into(),
            server: false,
            nginx: false,
            status: ContainerStatus::Pending,
            machine: None,
        }
    }

    /// Server wins over proxy; everything else is a service.
    pub fn role(&self) -> Role {
        if self.server {
            Role::Server
        } else if self.nginx {
            Role::Proxy
        } else {
            Role::Service
        }
    }
}

/// Coarse state of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Unprovisioned,
    /// Machine and private network exist.
    Provisioned,
    /// Project files are on the machine and its address is known.
    Synced,
    ImageBuilt,
    ContainersCreated,
    Failed(DeployErrorKind),
}

impl From<&DeployError> for DeploymentStatus {
    fn from(err: &DeployError) -> Self {
        DeploymentStatus::Failed(err.kind())
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Unprovisioned => f.write_str("unprovisioned"),
            DeploymentStatus::Provisioned => f.write_str("provisioned"),
            DeploymentStatus::Synced => f.write_str("synced"),
            DeploymentStatus::ImageBuilt => f.write_str("image-built"),
            DeploymentStatus::ContainersCreated => f.write_str("containers-created"),
            DeploymentStatus::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

/// State of one project's deployment.
///
/// Steps never mutate a shared record; they take one by value and hand back
/// the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRecord {
    pub clean_name: CleanName,
    pub base_path: PathBuf,
    /// Provisioning handle, `dockdev-<cleanName>`.
    pub machine: String,
    /// Set by the sync step.
    pub ip_address: Option<String>,
    pub containers: Vec<Container>,
    pub counter: u64,
    pub status: DeploymentStatus,
}

impl DeploymentRecord {
    pub fn new(clean_name: CleanName, base_path: impl Into<PathBuf>) -> Self {
        let machine = format!("{}{}", MACHINE_PREFIX, clean_name);
        Self {
            clean_name,
            base_path: base_path.into(),
            machine,
            ip_address: None,
            containers: Vec::new(),
            counter: 0,
            status: DeploymentStatus::Unprovisioned,
        }
    }

    /// Seed containers and counter from a loaded project file.
    ///
    /// A server entry left over from an earlier deployment carries the built
    /// image; it is pointed back at the project's base image.
    pub fn with_project(self, project: &ProjectConfig) -> Self {
        let containers = project
            .containers
            .iter()
            .map(|c| match &project.base_image {
                Some(base) if c.server => Container {
                    image: base.clone(),
                    ..c.clone()
                },
                _ => c.clone(),
            })
            .collect();
        Self {
            containers,
            counter: project.counter,
            ..self
        }
    }

    /// Drop every container's id and machine, as after the machine they
    /// lived on was replaced. All of them are created again.
    pub fn without_placements(self) -> Self {
        let containers = self
            .containers
            .iter()
            .map(|c| Container {
                docker_id: None,
                status: ContainerStatus::Pending,
                machine: None,
                ..c.clone()
            })
            .collect();
        Self { containers, ..self }
    }

    pub fn with_ip_address(self, ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
            ..self
        }
    }

    pub fn with_containers(self, containers: Vec<Container>) -> Self {
        Self { containers, ..self }
    }

    pub fn with_counter(self, counter: u64) -> Self {
        Self { counter, ..self }
    }

    pub fn with_status(self, status: DeploymentStatus) -> Self {
        Self { status, ..self }
    }

    /// Name of the private network joining server and services.
    pub fn network_name(&self) -> &str {
        self.clean_name.as_str()
    }

    /// `dockdev/<cleanName>:<counter>`.
    pub fn server_image_tag(&self) -> String {
        format!("{}{}:{}", IMAGE_REPOSITORY, self.clean_name, self.counter)
    }

    /// The single application-server container.
    pub fn server_container(&self) -> Result<&Container, DeployError> {
        find_server(&self.containers)
    }

    /// Exactly one server and at most one proxy.
    pub fn validate_containers(&self) -> Result<(), DeployError> {
        self.server_container()?;
        if self.containers.iter().filter(|c| c.nginx).count() > 1 {
            return Err(DeployError::InvalidContainers(
                "more than one proxy container".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_proxy(&self) -> bool {
        self.containers.iter().any(|c| c.nginx)
    }
}

/// The one container with `server` set; zero or several is an error.
pub fn find_server(containers: &[Container]) -> Result<&Container, DeployError> {
    let mut servers = containers.iter().filter(|c| c.server);
    match (servers.next(), servers.next()) {
        (Some(server), None) => Ok(server),
        (None, _) => Err(DeployError::InvalidContainers(
            "no application-server container".to_string(),
        )),
        (Some(_), Some(_)) => Err(DeployError::InvalidContainers(
            "more than one application-server container".to_string(),
        )),
    }
}
