// ABOUTME: SSH session management using russh.
// ABOUTME: Connects with the machine's private key and runs commands with a timeout.

use super::error::{Error, Result};
use super::forward::{self, ForwardHandle};
use parking_lot::Mutex;
use russh::client::{self, Config, Handle};
use russh::keys::known_hosts::{check_known_hosts_path, learn_known_hosts_path};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{ChannelMsg, Disconnect};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where and how to reach a machine over SSH.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Private key created by the provisioning backend for this machine.
    pub key_path: PathBuf,
    /// Host keys of machines we provisioned. Unknown hosts are learned here.
    pub known_hosts_path: Option<PathBuf>,
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: key_path.into(),
            known_hosts_path: None,
            // image builds run through exec, so allow well beyond a typical command
            command_timeout: Duration::from_secs(30 * 60),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Output from a remote command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: u32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub(crate) struct SshHandler {
    host: String,
    port: u16,
    known_hosts_path: Option<PathBuf>,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        // Without a known_hosts file the machine was just created by us; accept it.
        let Some(path) = &self.known_hosts_path else {
            return Ok(true);
        };

        match check_known_hosts_path(&self.host, self.port, server_public_key, path) {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::debug!("learning host key for {}:{}", self.host, self.port);
                if let Err(e) = learn_known_hosts_path(&self.host, self.port, server_public_key, path) {
                    tracing::warn!("failed to save host key to {}: {}", path.display(), e);
                }
                Ok(true)
            }
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::warn!("host key for {}:{} changed, refusing", self.host, self.port);
                Ok(false)
            }
            Err(e) => {
                tracing::debug!("known_hosts unreadable ({}), accepting host key", e);
                Ok(true)
            }
        }
    }
}

/// An authenticated SSH session to one machine.
pub struct Session {
    config: SessionConfig,
    handle: Arc<Handle<SshHandler>>,
    forwarders: Mutex<Vec<ForwardHandle>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let key = load_secret_key(&config.key_path, None).map_err(|e| Error::KeyLoadFailed {
            path: config.key_path.clone(),
            reason: e.to_string(),
        })?;

        let russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            known_hosts_path: config.known_hosts_path.clone(),
        };

        let mut handle = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        )
        .await
        .map_err(|e| Error::Connection {
            host: config.host.clone(),
            port: config.port,
            reason: e.to_string(),
        })?;

        let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
        let auth = handle
            .authenticate_publickey(
                &config.user,
                PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
            )
            .await?;
        if !auth.success() {
            return Err(Error::AuthenticationFailed(config.user.clone()));
        }

        tracing::debug!("ssh session established to {}@{}", config.user, config.host);

        Ok(Self {
            config,
            handle: Arc::new(handle),
            forwarders: Mutex::new(Vec::new()),
        })
    }

    /// Execute a command with the session's default timeout.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        let timeout = self.config.command_timeout;
        tokio::time::timeout(timeout, self.exec_inner(command))
            .await
            .map_err(|_| Error::CommandTimeout(timeout))?
    }

    async fn exec_inner(&self, command: &str) -> Result<CommandOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_code = None;
        let mut got_eof = false;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => stdout.extend_from_slice(&data),
                // ext 1 is stderr
                ChannelMsg::ExtendedData { data, ext: 1 } => stderr.extend_from_slice(&data),
                ChannelMsg::ExitStatus { exit_status } => {
                    exit_code = Some(exit_status);
                    if got_eof {
                        break;
                    }
                }
                ChannelMsg::Eof => {
                    got_eof = true;
                    if exit_code.is_some() {
                        break;
                    }
                }
                ChannelMsg::Close => break,
                _ => {}
            }
        }

        let exit_code = exit_code.ok_or(Error::ChannelClosed)?;
        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Expose a remote Unix socket as a local one. Returns the local path.
    pub async fn forward_socket(&self, remote_socket: &str) -> Result<String> {
        let handle = forward::start_forward(Arc::clone(&self.handle), remote_socket).await?;
        let path = handle.path().to_string();
        self.forwarders.lock().push(handle);
        Ok(path)
    }

    pub async fn disconnect(self) -> Result<()> {
        let forwarders: Vec<_> = self.forwarders.lock().drain(..).collect();
        for forwarder in forwarders {
            forwarder.stop();
        }

        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
