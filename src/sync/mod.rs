// ABOUTME: One-way transfer of the project directory to the machine.
// ABOUTME: Argument building is pure; the rsync runner spawns the process.

mod args;
mod rsync;

pub use args::{RemoteTarget, SyncArgs, sync_source};
pub use rsync::Rsync;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot prepare {path}: {source}")]
    Destination {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// A file synchronization tool.
#[async_trait]
pub trait FileSync: Send + Sync {
    async fn sync(&self, args: &SyncArgs) -> Result<(), SyncError>;
}
