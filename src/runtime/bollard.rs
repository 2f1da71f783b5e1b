// ABOUTME: Bollard-based container runtime for provisioned machines.
// ABOUTME: Reaches each machine's docker socket through an SSH-forwarded Unix socket.

use super::error::{ClientSnafu, ConnectError, InspectSnafu, TunnelSnafu};
use super::traits::{
    ContainerConfig, ContainerError, ContainerOps, ImageError, ImageOps, NetworkError, NetworkOps,
};
use crate::machine::MachineOps;
use crate::ssh::{Session, SessionConfig};
use crate::types::ContainerId;
use async_trait::async_trait;
use bollard::Docker;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, HostConfig, NetworkCreateRequest, PortBinding};
use bollard::query_parameters::{CreateContainerOptions, CreateImageOptions, StartContainerOptions};
use futures::StreamExt;
use snafu::ResultExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const REMOTE_DOCKER_SOCKET: &str = "/var/run/docker.sock";
const CLIENT_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn status_code(e: &BollardError) -> Option<u16> {
    match e {
        BollardError::DockerResponseServerError { status_code, .. } => Some(*status_code),
        _ => None,
    }
}

fn map_container_create_error(e: BollardError) -> ContainerError {
    match status_code(&e) {
        Some(404) => ContainerError::ImageNotFound(e.to_string()),
        Some(409) => ContainerError::AlreadyExists(e.to_string()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: BollardError) -> ContainerError {
    match status_code(&e) {
        Some(404) => ContainerError::NotFound(e.to_string()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

/// The engine pulls every tag of an untagged reference; pin `latest` instead.
fn with_default_tag(image: &str) -> String {
    let last = image.rsplit('/').next().unwrap_or(image);
    if last.contains(':') || last.contains('@') {
        image.to_string()
    } else {
        format!("{}:latest", image)
    }
}

fn map_network_create_error(e: BollardError, name: &str) -> NetworkError {
    match status_code(&e) {
        Some(409) => NetworkError::AlreadyExists(name.to_string()),
        _ => NetworkError::Runtime(e.to_string()),
    }
}

// =============================================================================
// RemoteDocker
// =============================================================================

struct Connection {
    session: Session,
    client: Docker,
}

/// Docker Engine API client for machines known to a provisioning backend.
///
/// The first call for a machine opens an SSH session, forwards the remote
/// docker socket and keeps both until [`RemoteDocker::disconnect_all`].
pub struct RemoteDocker<M> {
    machines: M,
    known_hosts_path: Option<PathBuf>,
    connections: Mutex<HashMap<String, Arc<Connection>>>,
}

impl<M: MachineOps> RemoteDocker<M> {
    pub fn new(machines: M) -> Self {
        Self {
            machines,
            known_hosts_path: None,
            connections: Mutex::new(HashMap::new()),
        }
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    async fn client(&self, machine: &str) -> Result<Docker, ConnectError> {
        let mut connections = self.connections.lock().await;
        if let Some(conn) = connections.get(machine) {
            return Ok(conn.client.clone());
        }

        let info = self
            .machines
            .inspect(machine)
            .await
            .context(InspectSnafu { machine })?;

        let mut config = SessionConfig::new(&info.ip_address, &info.ssh_user, &info.ssh_key_path)
            .port(info.ssh_port);
        if let Some(path) = &self.known_hosts_path {
            config = config.known_hosts_path(path);
        }

        let session = Session::connect(config).await.context(TunnelSnafu { machine })?;
        let local_socket = session
            .forward_socket(REMOTE_DOCKER_SOCKET)
            .await
            .context(TunnelSnafu { machine })?;
        let client =
            Docker::connect_with_unix(&local_socket, CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
                .context(ClientSnafu { machine })?;

        tracing::debug!("docker on {} reachable via {}", machine, local_socket);
        connections.insert(
            machine.to_string(),
            Arc::new(Connection {
                session,
                client: client.clone(),
            }),
        );
        Ok(client)
    }

    /// Close every SSH session opened so far.
    pub async fn disconnect_all(&self) {
        let drained: Vec<_> = self.connections.lock().await.drain().collect();
        for (machine, conn) in drained {
            match Arc::try_unwrap(conn) {
                Ok(conn) => {
                    if let Err(e) = conn.session.disconnect().await {
                        tracing::debug!("disconnect from {} failed: {}", machine, e);
                    }
                }
                Err(_) => tracing::debug!("connection to {} still in use, dropping", machine),
            }
        }
    }
}

#[async_trait]
impl<M: MachineOps> ContainerOps for RemoteDocker<M> {
    async fn create_container(
        &self,
        machine: &str,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let client = self
            .client(machine)
            .await
            .map_err(|e| ContainerError::Connection(e.to_string()))?;

        let port_bindings = config.host_config.port_bindings.as_ref().map(|bindings| {
            bindings
                .iter()
                .map(|(port, hosts)| {
                    let hosts = hosts
                        .iter()
                        .map(|b| PortBinding {
                            host_ip: None,
                            host_port: Some(b.host_port.clone()),
                        })
                        .collect();
                    (port.clone(), Some(hosts))
                })
                .collect::<HashMap<_, _>>()
        });

        let body = ContainerCreateBody {
            image: Some(config.image.clone()),
            env: config.env.clone(),
            exposed_ports: config
                .exposed_ports
                .as_ref()
                .map(|ports| ports.keys().cloned().collect()),
            host_config: Some(HostConfig {
                network_mode: config.host_config.network_mode.clone(),
                binds: config.host_config.binds.clone(),
                port_bindings,
                ..Default::default()
            }),
            ..Default::default()
        };
        let opts = CreateContainerOptions {
            name: Some(config.name.clone()),
            ..Default::default()
        };

        let response = client
            .create_container(Some(opts), body)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, machine: &str, id: &ContainerId) -> Result<(), ContainerError> {
        let client = self
            .client(machine)
            .await
            .map_err(|e| ContainerError::Connection(e.to_string()))?;

        client
            .start_container(id.as_str(), None::<StartContainerOptions>)
            .await
            .map_err(map_container_start_error)
    }
}

#[async_trait]
impl<M: MachineOps> ImageOps for RemoteDocker<M> {
    async fn image_exists(&self, machine: &str, image: &str) -> Result<bool, ImageError> {
        let client = self
            .client(machine)
            .await
            .map_err(|e| ImageError::Connection(e.to_string()))?;

        match client.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(e) if status_code(&e) == Some(404) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!("failed to inspect {}: {}", image, e))),
        }
    }

    async fn pull_image(&self, machine: &str, image: &str) -> Result<(), ImageError> {
        let client = self
            .client(machine)
            .await
            .map_err(|e| ImageError::Connection(e.to_string()))?;

        let opts = CreateImageOptions {
            from_image: Some(with_default_tag(image)),
            ..Default::default()
        };

        // progress stream; drain it to completion
        let mut stream = client.create_image(Some(opts), None, None);
        while let Some(progress) = stream.next().await {
            progress.map_err(|e| ImageError::PullFailed(format!("{}: {}", image, e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl<M: MachineOps> NetworkOps for RemoteDocker<M> {
    async fn create_network(&self, machine: &str, name: &str) -> Result<String, NetworkError> {
        let client = self
            .client(machine)
            .await
            .map_err(|e| NetworkError::Connection(e.to_string()))?;

        let request = NetworkCreateRequest {
            name: name.to_string(),
            driver: Some("bridge".to_string()),
            ..Default::default()
        };

        let response = client
            .create_network(request)
            .await
            .map_err(|e| map_network_create_error(e, name))?;

        Ok(response.id)
    }
}
