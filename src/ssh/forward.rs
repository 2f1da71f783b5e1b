// ABOUTME: Local Unix socket tunnelled to a remote Unix socket over SSH.
// ABOUTME: Lets bollard talk to the machine's docker daemon without exposing its TCP port.

use super::client::SshHandler;
use super::error::{Error, Result};
use russh::ChannelMsg;
use russh::client::Handle;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

/// A running forwarder. The local socket file is removed when it stops.
pub struct ForwardHandle {
    local_path: PathBuf,
    task: JoinHandle<()>,
}

impl ForwardHandle {
    pub fn path(&self) -> &str {
        self.local_path.to_str().unwrap_or_default()
    }

    pub fn stop(self) {
        // Drop does the work.
    }
}

impl Drop for ForwardHandle {
    fn drop(&mut self) {
        self.task.abort();
        let _ = std::fs::remove_file(&self.local_path);
    }
}

pub(crate) async fn start_forward(
    handle: Arc<Handle<SshHandler>>,
    remote_socket: &str,
) -> Result<ForwardHandle> {
    let local_path = local_socket_path();
    let _ = std::fs::remove_file(&local_path);

    let listener = UnixListener::bind(&local_path).map_err(|e| {
        Error::SocketForwardFailed(format!("failed to bind {}: {}", local_path.display(), e))
    })?;

    tracing::debug!(
        "forwarding {} -> remote {}",
        local_path.display(),
        remote_socket
    );

    let task = tokio::spawn(accept_loop(listener, handle, remote_socket.to_string()));
    Ok(ForwardHandle { local_path, task })
}

fn local_socket_path() -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("dockdev-{}-{}.sock", std::process::id(), n))
}

async fn accept_loop(listener: UnixListener, handle: Arc<Handle<SshHandler>>, remote_socket: String) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::warn!("accept failed on forwarded socket: {}", e);
                return;
            }
        };
        let handle = Arc::clone(&handle);
        let remote_socket = remote_socket.clone();
        tokio::spawn(async move {
            if let Err(e) = pipe(stream, &handle, &remote_socket).await {
                tracing::debug!("forwarded connection ended: {}", e);
            }
        });
    }
}

/// Shuttle bytes between one local connection and a direct-streamlocal channel.
async fn pipe(mut local: UnixStream, handle: &Handle<SshHandler>, remote_socket: &str) -> Result<()> {
    let mut channel = handle
        .channel_open_direct_streamlocal(remote_socket)
        .await
        .map_err(|e| Error::SocketForwardFailed(format!("{}: {}", remote_socket, e)))?;

    let mut buf = vec![0u8; 64 * 1024];
    let mut local_done = false;

    loop {
        tokio::select! {
            read = local.read(&mut buf), if !local_done => match read {
                Ok(0) => {
                    local_done = true;
                    channel.eof().await?;
                }
                Ok(n) => channel.data(&buf[..n]).await?,
                Err(e) => return Err(Error::SocketForwardFailed(e.to_string())),
            },
            msg = channel.wait() => match msg {
                Some(ChannelMsg::Data { data }) => {
                    local
                        .write_all(&data)
                        .await
                        .map_err(|e| Error::SocketForwardFailed(e.to_string()))?;
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => return Ok(()),
                Some(_) => {}
            },
        }
    }
}
