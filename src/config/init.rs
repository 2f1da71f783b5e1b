// ABOUTME: Scaffolding of dockdev.json for new projects.
// ABOUTME: Seeds a single application-server container from a base image.

use super::ProjectConfig;
use crate::deploy::Container;
use crate::error::{Error, Result};
use crate::types::CleanName;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_IMAGE: &str = "node:lts";

/// Write a new dockdev.json into `dir`. Returns the path written.
pub fn init_config(
    dir: &Path,
    name: Option<&str>,
    image: Option<&str>,
    force: bool,
) -> Result<PathBuf> {
    let path = ProjectConfig::path(dir);
    if path.exists() && !force {
        return Err(Error::AlreadyExists(path));
    }

    let project_name = match name {
        Some(name) => name.to_string(),
        None => dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidConfig("cannot infer project name".to_string()))?,
    };
    let clean_name = CleanName::from_project_name(&project_name)
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let base_image = image.unwrap_or(DEFAULT_BASE_IMAGE);
    let mut config = ProjectConfig::new(project_name, clean_name.clone());
    config.base_image = Some(base_image.to_string());
    config.containers.push(Container::server(clean_name, base_image));
    config.save(dir)?;

    Ok(path)
}
