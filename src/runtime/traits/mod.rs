// ABOUTME: Composable capability traits for the container runtime.
// ABOUTME: Every operation names the machine it runs on.

mod container;
mod image;
mod network;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use image::{ImageError, ImageOps};
pub use network::{NetworkError, NetworkOps};
pub use shared_types::*;

/// Everything the pipeline needs from a runtime.
pub trait ContainerRuntime: ContainerOps + ImageOps + NetworkOps {}

impl<T: ContainerOps + ImageOps + NetworkOps> ContainerRuntime for T {}
