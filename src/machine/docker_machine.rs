// ABOUTME: MachineOps backed by the docker-machine CLI.
// ABOUTME: Spawns docker-machine for create/inspect and uses russh for commands.

use super::{MachineError, MachineInfo, MachineOps};
use crate::config::{AccessToken, DriverOptions};
use crate::ssh::{CommandOutput, Session, SessionConfig};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

const DRIVER: &str = "digitalocean";

/// Provisioning backend that shells out to `docker-machine`.
#[derive(Debug, Clone)]
pub struct DockerMachine {
    program: String,
    known_hosts_path: Option<PathBuf>,
}

impl Default for DockerMachine {
    fn default() -> Self {
        Self {
            program: "docker-machine".to_string(),
            known_hosts_path: None,
        }
    }
}

impl DockerMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different binary (e.g. an absolute path).
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Record host keys of created machines in this file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Arguments for `docker-machine create`.
    pub fn create_args(name: &str, token: &AccessToken, driver: &DriverOptions) -> Vec<String> {
        let mut args = vec![
            "create".to_string(),
            "--driver".to_string(),
            DRIVER.to_string(),
            "--digitalocean-access-token".to_string(),
            token.expose().to_string(),
        ];
        for (flag, value) in [
            ("--digitalocean-region", &driver.region),
            ("--digitalocean-size", &driver.size),
            ("--digitalocean-image", &driver.image),
        ] {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value.clone());
            }
        }
        args.push(name.to_string());
        args
    }

    async fn run(&self, args: &[String], display: &str) -> Result<String, MachineError> {
        let shown = display;
        tracing::debug!("running {} {}", self.program, shown);

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MachineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MachineError::CommandFailed {
                command: format!("{} {}", self.program, display),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl MachineOps for DockerMachine {
    async fn create_machine(
        &self,
        name: &str,
        token: &AccessToken,
        driver: &DriverOptions,
    ) -> Result<(), MachineError> {
        let args = Self::create_args(name, token, driver);
        // never log the token
        let display = format!("create --driver {} … {}", DRIVER, name);
        self.run(&args, &display).await?;
        tracing::info!("machine {} created", name);
        Ok(())
    }

    async fn inspect(&self, name: &str) -> Result<MachineInfo, MachineError> {
        let args = ["inspect".to_string(), name.to_string()];
        let stdout = self.run(&args, &args.join(" ")).await?;
        MachineInfo::from_inspect_json(name, &stdout)
    }

    async fn ssh(&self, name: &str, command: &str) -> Result<CommandOutput, MachineError> {
        let info = self.inspect(name).await?;
        let ssh_err = |source| MachineError::Ssh {
            machine: name.to_string(),
            source,
        };

        let mut config = SessionConfig::new(&info.ip_address, &info.ssh_user, &info.ssh_key_path)
            .port(info.ssh_port);
        if let Some(path) = &self.known_hosts_path {
            config = config.known_hosts_path(path);
        }

        let session = Session::connect(config).await.map_err(ssh_err)?;
        tracing::debug!("{}$ {}", name, command);
        let output = session.exec(command).await.map_err(ssh_err)?;
        if let Err(e) = session.disconnect().await {
            tracing::debug!("ssh disconnect from {} failed: {}", name, e);
        }
        Ok(output)
    }
}
