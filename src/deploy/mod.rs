// ABOUTME: Deployment pipeline using the type state pattern.
// ABOUTME: Exports the record, state markers, step functions and the orchestrator.

mod containers;
mod deployment;
mod dockerfile;
mod error;
mod generator;
mod orchestrator;
mod record;
mod state;
mod transitions;

pub use containers::{
    add_nginx_container, create_remote_container, remote_server_obj, start_remote_container,
};
pub use deployment::Deployment;
pub use dockerfile::{DOCKERFILE_NAME, create_dockerfile, dockerfile_contents};
pub use error::{DeployError, DeployErrorKind};
pub use generator::{CONTROL_SOCKET_BIND, PROXY_HOST_PORT, PROXY_PORT, generate_config};
pub use orchestrator::{DeployOptions, Orchestrator};
pub use record::{
    Container, ContainerStatus, DeploymentRecord, DeploymentStatus, Role, find_server,
};
pub use state::{ContainersCreated, ImageBuilt, Provisioned, Synced, Unprovisioned};
pub use transitions::{build_server_image, init_remote, sync_files_to_remote};
