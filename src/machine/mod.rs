// ABOUTME: Provisioning backend that creates and inspects remote virtual machines.
// ABOUTME: The docker-machine implementation drives the DigitalOcean driver.

mod docker_machine;
mod error;
mod info;

pub use docker_machine::DockerMachine;
pub use error::MachineError;
pub use info::MachineInfo;

use crate::config::{AccessToken, DriverOptions};
use crate::ssh::CommandOutput;
use async_trait::async_trait;

/// Operations the pipeline needs from the provisioning backend.
#[async_trait]
pub trait MachineOps: Send + Sync {
    /// Create a named virtual machine. May take minutes.
    async fn create_machine(
        &self,
        name: &str,
        token: &AccessToken,
        driver: &DriverOptions,
    ) -> Result<(), MachineError>;

    /// Connection metadata (address, SSH endpoint) for an existing machine.
    async fn inspect(&self, name: &str) -> Result<MachineInfo, MachineError>;

    /// Run a shell command on the machine and return its output.
    async fn ssh(&self, name: &str, command: &str) -> Result<CommandOutput, MachineError>;
}
