// ABOUTME: Builds role containers and instantiates them on the remote machine.
// ABOUTME: Every helper returns new values; inputs are never modified.

use super::error::DeployError;
use super::generator::generate_config;
use super::record::{Container, ContainerStatus, DeploymentRecord};
use crate::config::PROXY_IMAGE;
use crate::runtime::{ContainerError, ContainerOps};

/// The canonical application-server entry for the record's current counter.
pub fn remote_server_obj(record: &DeploymentRecord) -> Container {
    Container {
        clean_name: record.clean_name.clone(),
        image: record.server_image_tag(),
        docker_id: None,
        name: format!("server{}", record.counter),
        server: true,
        nginx: false,
        status: ContainerStatus::Pending,
        machine: Some(record.machine.clone()),
    }
}

/// Append the reverse proxy to `containers`.
///
/// # Errors
///
/// Returns `DeployError::InvalidContainers` if a proxy is already present.
pub fn add_nginx_container(
    containers: &[Container],
    record: &DeploymentRecord,
) -> Result<Vec<Container>, DeployError> {
    if containers.iter().any(|c| c.nginx) {
        return Err(DeployError::InvalidContainers(
            "project already has a proxy container".to_string(),
        ));
    }

    let mut next = containers.to_vec();
    next.push(Container {
        clean_name: record.clean_name.clone(),
        image: PROXY_IMAGE.to_string(),
        docker_id: None,
        name: "proxy".to_string(),
        server: false,
        nginx: true,
        status: ContainerStatus::Pending,
        machine: None,
    });
    Ok(next)
}

/// Create `container` on the record's machine. The returned entry differs
/// from the input only in `docker_id` and `machine`.
///
/// Runtime failures are returned unchanged; the caller decides whether the
/// remaining containers are still worth creating.
pub async fn create_remote_container<R: ContainerOps + ?Sized>(
    runtime: &R,
    container: &Container,
    record: &DeploymentRecord,
) -> Result<Container, ContainerError> {
    let config = generate_config(container, record);
    tracing::debug!(
        "creating {} on {}: {}",
        container.name,
        record.machine,
        serde_json::to_string(&config).unwrap_or_default()
    );

    let id = runtime.create_container(&record.machine, &config).await?;
    tracing::info!("created {} ({}) on {}", container.name, id, record.machine);

    Ok(Container {
        docker_id: Some(id),
        machine: Some(record.machine.clone()),
        ..container.clone()
    })
}

/// Start a container that [`create_remote_container`] produced.
pub async fn start_remote_container<R: ContainerOps + ?Sized>(
    runtime: &R,
    container: &Container,
    record: &DeploymentRecord,
) -> Result<Container, DeployError> {
    let id = container.docker_id.as_ref().ok_or_else(|| {
        DeployError::ContainerStart(format!("{} has not been created", container.name))
    })?;

    runtime
        .start_container(&record.machine, id)
        .await
        .map_err(|e| DeployError::ContainerStart(format!("{}: {}", container.name, e)))?;

    Ok(Container {
        status: ContainerStatus::Running,
        ..container.clone()
    })
}
