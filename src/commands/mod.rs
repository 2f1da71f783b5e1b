// ABOUTME: Command module aggregator for the dockdev CLI.
// ABOUTME: Re-exports the init, deploy and status handlers.

mod deploy;
mod init;
mod status;

pub use deploy::deploy;
pub use init::init;
pub use status::status;

use dockdev::config::ProjectConfig;
use dockdev::error::Result;
use std::path::{Path, PathBuf};

/// Absolute project directory: `path` itself, or the nearest ancestor of
/// the working directory holding a dockdev.json.
fn project_dir(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(std::fs::canonicalize(path)?),
        None => ProjectConfig::discover(&std::env::current_dir()?),
    }
}
