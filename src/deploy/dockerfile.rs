// ABOUTME: Materializes the application server's Dockerfile in the project directory.
// ABOUTME: The template is fixed; only the base image line varies.

use super::error::DeployError;
use super::record::{Container, find_server};
use std::path::{Path, PathBuf};

pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Dockerfile text for a server built on `base_image`.
pub fn dockerfile_contents(base_image: &str) -> String {
    format!(
        "From {base_image}\n\
         COPY . /app\n\
         WORKDIR /app\n\
         RUN [\"npm\", \"install\", \"--production\"]\n\
         EXPOSE 3000\n\
         CMD [\"npm\", \"start\"]\n"
    )
}

/// Write the Dockerfile for the single server container into `base_path`.
///
/// # Errors
///
/// Returns `DeployError::InvalidContainers` unless exactly one container is
/// the server, and `DeployError::Dockerfile` if the file cannot be written.
pub async fn create_dockerfile(
    containers: &[Container],
    base_path: &Path,
) -> Result<PathBuf, DeployError> {
    let server = find_server(containers)?;
    let path = base_path.join(DOCKERFILE_NAME);

    tokio::fs::write(&path, dockerfile_contents(&server.image))
        .await
        .map_err(|e| DeployError::Dockerfile(format!("{}: {}", path.display(), e)))?;

    tracing::info!("wrote {} from {}", path.display(), server.image);
    Ok(path)
}
