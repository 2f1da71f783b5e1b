// ABOUTME: Maps a container's role to the payload the runtime needs to start it.
// ABOUTME: Pure function; identical inputs always produce identical configs.

use super::record::{Container, DeploymentRecord, Role};
use crate::runtime::{ContainerConfig, ExposedPort, HostConfig, PortBinding};
use std::collections::BTreeMap;

/// Host socket mounted read-only into the proxy so it can watch containers.
pub const CONTROL_SOCKET_BIND: &str = "/var/run/docker.sock:/tmp/docker.sock:ro";
pub const PROXY_PORT: &str = "80/tcp";
pub const PROXY_HOST_PORT: &str = "80";

/// Build the runtime config for `container` within `record`.
pub fn generate_config(container: &Container, record: &DeploymentRecord) -> ContainerConfig {
    match container.role() {
        Role::Server => ContainerConfig {
            image: container.image.clone(),
            name: container.name.clone(),
            env: Some(vec![format!(
                "VIRTUAL_HOST={}",
                record.ip_address.as_deref().unwrap_or_default()
            )]),
            host_config: private_network(record),
            exposed_ports: None,
        },
        Role::Proxy => ContainerConfig {
            image: container.image.clone(),
            name: container.name.clone(),
            env: None,
            host_config: HostConfig {
                network_mode: None,
                binds: Some(vec![CONTROL_SOCKET_BIND.to_string()]),
                port_bindings: Some(BTreeMap::from([(
                    PROXY_PORT.to_string(),
                    vec![PortBinding {
                        host_port: PROXY_HOST_PORT.to_string(),
                    }],
                )])),
            },
            exposed_ports: Some(BTreeMap::from([(PROXY_PORT.to_string(), ExposedPort {})])),
        },
        Role::Service => ContainerConfig {
            image: container.image.clone(),
            name: container.name.clone(),
            env: None,
            host_config: private_network(record),
            exposed_ports: None,
        },
    }
}

fn private_network(record: &DeploymentRecord) -> HostConfig {
    HostConfig {
        network_mode: Some(record.network_name().to_string()),
        ..Default::default()
    }
}
