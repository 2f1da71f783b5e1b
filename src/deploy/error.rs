// ABOUTME: Domain errors for the deployment pipeline.
// ABOUTME: Each step collapses its low-level failure into one kind naming the step.

use crate::runtime::{ContainerError, ImageError, NetworkError};
use std::fmt;

/// Errors that end a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// No provisioning token in the local settings file. Raised before any remote call.
    #[error("missing DigitalOcean access token (set DOToken in {0})")]
    MissingToken(String),

    /// The local settings file exists but cannot be read.
    #[error("failed to read local settings: {0}")]
    LocalConfig(String),

    /// dockdev.json could not be read or written.
    #[error("project configuration error: {0}")]
    ProjectConfig(String),

    /// The container list breaks the one-server / one-proxy rules.
    #[error("invalid container set: {0}")]
    InvalidContainers(String),

    #[error("failed to provision machine: {0}")]
    Provision(String),

    #[error("failed to create network: {0}")]
    Network(String),

    #[error("Dockerfile creation failed: {0}")]
    Dockerfile(String),

    #[error("sync to remote failed: {0}")]
    Sync(String),

    #[error("image build failed: {0}")]
    Build(String),

    #[error("failed to pull image: {0}")]
    ImagePull(String),

    #[error("failed to create container: {0}")]
    ContainerCreate(String),

    #[error("failed to start container: {0}")]
    ContainerStart(String),
}

/// Error kind for programmatic handling and for the failed deployment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployErrorKind {
    MissingToken,
    LocalConfig,
    ProjectConfig,
    InvalidContainers,
    Provision,
    Network,
    Dockerfile,
    Sync,
    Build,
    ImagePull,
    ContainerCreate,
    ContainerStart,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::MissingToken(_) => DeployErrorKind::MissingToken,
            DeployError::LocalConfig(_) => DeployErrorKind::LocalConfig,
            DeployError::ProjectConfig(_) => DeployErrorKind::ProjectConfig,
            DeployError::InvalidContainers(_) => DeployErrorKind::InvalidContainers,
            DeployError::Provision(_) => DeployErrorKind::Provision,
            DeployError::Network(_) => DeployErrorKind::Network,
            DeployError::Dockerfile(_) => DeployErrorKind::Dockerfile,
            DeployError::Sync(_) => DeployErrorKind::Sync,
            DeployError::Build(_) => DeployErrorKind::Build,
            DeployError::ImagePull(_) => DeployErrorKind::ImagePull,
            DeployError::ContainerCreate(_) => DeployErrorKind::ContainerCreate,
            DeployError::ContainerStart(_) => DeployErrorKind::ContainerStart,
        }
    }
}

impl fmt::Display for DeployErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployErrorKind::MissingToken => "missing-token",
            DeployErrorKind::LocalConfig => "local-config",
            DeployErrorKind::ProjectConfig => "project-config",
            DeployErrorKind::InvalidContainers => "invalid-containers",
            DeployErrorKind::Provision => "provision",
            DeployErrorKind::Network => "network",
            DeployErrorKind::Dockerfile => "dockerfile",
            DeployErrorKind::Sync => "sync",
            DeployErrorKind::Build => "build",
            DeployErrorKind::ImagePull => "image-pull",
            DeployErrorKind::ContainerCreate => "container-create",
            DeployErrorKind::ContainerStart => "container-start",
        };
        f.write_str(s)
    }
}

impl From<ImageError> for DeployError {
    fn from(err: ImageError) -> Self {
        DeployError::ImagePull(err.to_string())
    }
}

impl From<ContainerError> for DeployError {
    fn from(err: ContainerError) -> Self {
        DeployError::ContainerCreate(err.to_string())
    }
}

impl From<NetworkError> for DeployError {
    fn from(err: NetworkError) -> Self {
        DeployError::Network(err.to_string())
    }
}
