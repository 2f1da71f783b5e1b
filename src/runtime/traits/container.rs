// ABOUTME: Container operations trait for container runtimes.
// ABOUTME: Create and start containers on a named machine.

use super::shared_types::ContainerConfig;
use crate::types::ContainerId;
use async_trait::async_trait;

#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// Create a container from a generated config. Returns the runtime's id.
    async fn create_container(
        &self,
        machine: &str,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError>;

    async fn start_container(&self, machine: &str, id: &ContainerId) -> Result<(), ContainerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("cannot reach runtime: {0}")]
    Connection(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
