// ABOUTME: Container runtime access on provisioned machines.
// ABOUTME: Capability traits plus the bollard implementation reached over SSH.

mod bollard;
mod error;
pub mod traits;

pub use self::bollard::RemoteDocker;
pub use error::{ConnectError, ConnectErrorKind};
pub use traits::*;
