// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Check for and pull published images before containers use them.

use async_trait::async_trait;

#[async_trait]
pub trait ImageOps: Send + Sync {
    async fn image_exists(&self, machine: &str, image: &str) -> Result<bool, ImageError>;

    async fn pull_image(&self, machine: &str, image: &str) -> Result<(), ImageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("cannot reach runtime: {0}")]
    Connection(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
