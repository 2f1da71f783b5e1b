// ABOUTME: SSH client used to reach provisioned machines.
// ABOUTME: Key-file authentication, remote command execution and socket forwarding.

mod client;
mod error;
mod forward;

pub use client::{CommandOutput, Session, SessionConfig};
pub use error::{Error, Result};
pub use forward::ForwardHandle;
