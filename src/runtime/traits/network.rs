// ABOUTME: Network operations trait for container runtimes.
// ABOUTME: Creates the project's private bridge network.

use async_trait::async_trait;

#[async_trait]
pub trait NetworkOps: Send + Sync {
    async fn create_network(&self, machine: &str, name: &str) -> Result<String, NetworkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("network already exists: {0}")]
    AlreadyExists(String),

    #[error("cannot reach runtime: {0}")]
    Connection(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
