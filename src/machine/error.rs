// ABOUTME: Errors from the provisioning backend.
// ABOUTME: Process spawn failures, non-zero exits and unparseable inspect output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unexpected inspect output for {machine}: {reason}")]
    InvalidInspect { machine: String, reason: String },

    #[error("ssh to {machine} failed: {source}")]
    Ssh {
        machine: String,
        #[source]
        source: crate::ssh::Error,
    },
}
