// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Each marker only exposes the next legal step.

/// Nothing exists remotely yet.
/// Available actions: `provision()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Unprovisioned;

/// Machine and private network exist.
/// Available actions: `write_dockerfile()`, `sync_files()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Provisioned;

/// Project files are on the machine; its address is known.
/// Available actions: `build_image()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Synced;

/// Server image built and tagged with `counter`.
/// Available actions: `create_containers()`
#[derive(Debug, Clone, Copy)]
pub struct ImageBuilt {
    counter: u64,
}

impl ImageBuilt {
    pub(crate) fn new(counter: u64) -> Self {
        Self { counter }
    }

    /// Counter value embedded in the built image tag.
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

/// Every container created and started.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainersCreated;
