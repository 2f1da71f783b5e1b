// ABOUTME: Errors raised while connecting to a machine's docker daemon.
// ABOUTME: SNAFU context selectors keep the machine name on every variant.

use crate::machine::MachineError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConnectError {
    #[snafu(display("cannot inspect machine {machine}: {source}"))]
    Inspect {
        machine: String,
        source: MachineError,
    },

    #[snafu(display("ssh tunnel to {machine} failed: {source}"))]
    Tunnel {
        machine: String,
        source: crate::ssh::Error,
    },

    #[snafu(display("docker client for {machine} failed: {source}"))]
    Client {
        machine: String,
        source: bollard::errors::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// The provisioning backend could not describe the machine.
    Inspect,
    /// SSH login or socket forwarding failed.
    Tunnel,
    /// bollard rejected the forwarded socket.
    Client,
}

impl ConnectError {
    pub fn kind(&self) -> ConnectErrorKind {
        match self {
            ConnectError::Inspect { .. } => ConnectErrorKind::Inspect,
            ConnectError::Tunnel { .. } => ConnectErrorKind::Tunnel,
            ConnectError::Client { .. } => ConnectErrorKind::Client,
        }
    }

    pub fn machine(&self) -> &str {
        match self {
            ConnectError::Inspect { machine, .. }
            | ConnectError::Tunnel { machine, .. }
            | ConnectError::Client { machine, .. } => machine,
        }
    }
}
