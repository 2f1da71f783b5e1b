// ABOUTME: Source/destination normalization and rsync argument construction.
// ABOUTME: Remote targets go through ssh with the machine's own key.

use crate::machine::MachineInfo;
use std::path::{Path, PathBuf};

/// SSH endpoint of a remote destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// `user@host`
    pub target: String,
    pub port: u16,
    pub key_path: PathBuf,
}

/// Everything one synchronization run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs {
    pub source: String,
    pub destination: String,
    /// `None` copies to a local directory.
    pub remote: Option<RemoteTarget>,
}

/// `base_path` with a trailing `/` so the directory's contents are copied,
/// not the directory itself.
pub fn sync_source(base_path: &Path) -> String {
    let mut source = base_path.to_string_lossy().into_owned();
    if !source.ends_with('/') {
        source.push('/');
    }
    source
}

impl SyncArgs {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        info: &MachineInfo,
        local: bool,
    ) -> Self {
        let remote = (!local).then(|| RemoteTarget {
            target: info.ssh_target(),
            port: info.ssh_port,
            key_path: info.ssh_key_path.clone(),
        });
        Self {
            source: source.into(),
            destination: destination.into(),
            remote,
        }
    }

    pub fn is_local(&self) -> bool {
        self.remote.is_none()
    }

    /// Arguments for `rsync`, excluding the program name.
    pub fn to_command_args(&self) -> Vec<String> {
        let mut args = vec!["-az".to_string(), "--delete".to_string()];
        match &self.remote {
            Some(remote) => {
                args.push("-e".to_string());
                args.push(format!(
                    "ssh -i '{}' -p {} -o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null",
                    remote.key_path.display(),
                    remote.port
                ));
                // rsync only creates the last path component on its own
                args.push("--rsync-path".to_string());
                args.push(format!("mkdir -p '{}' && rsync", self.destination));
                args.push(self.source.clone());
                args.push(format!("{}:{}", remote.target, self.destination));
            }
            None => {
                args.push(self.source.clone());
                args.push(self.destination.clone());
            }
        }
        args
    }
}
