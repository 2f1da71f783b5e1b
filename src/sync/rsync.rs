// ABOUTME: FileSync implementation that spawns rsync.
// ABOUTME: Local destinations are created first; remote ones via --rsync-path.

use super::{FileSync, SyncArgs, SyncError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct Rsync {
    program: String,
}

impl Default for Rsync {
    fn default() -> Self {
        Self {
            program: "rsync".to_string(),
        }
    }
}

impl Rsync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl FileSync for Rsync {
    async fn sync(&self, args: &SyncArgs) -> Result<(), SyncError> {
        if args.is_local() {
            tokio::fs::create_dir_all(&args.destination)
                .await
                .map_err(|source| SyncError::Destination {
                    path: args.destination.clone(),
                    source,
                })?;
        }

        let argv = args.to_command_args();
        tracing::debug!("{} {}", self.program, argv.join(" "));

        let output = Command::new(&self.program)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SyncError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SyncError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::info!("synced {} -> {}", args.source, args.destination);
        Ok(())
    }
}
