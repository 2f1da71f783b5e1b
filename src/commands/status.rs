// ABOUTME: Status command implementation.
// ABOUTME: Prints what dockdev.json records about the last deployment.

use super::project_dir;
use dockdev::config::ProjectConfig;
use dockdev::error::Result;
use dockdev::output::Output;
use std::path::Path;

pub fn status(path: Option<&Path>, output: &Output) -> Result<()> {
    let dir = project_dir(path)?;
    let project = ProjectConfig::load(&dir)?;

    output.progress(&format!("Project: {} ({})", project.project_name, project.clean_name));
    output.progress(&format!(
        "Machine: {}",
        project.machine.as_deref().unwrap_or("not provisioned")
    ));
    output.progress(&format!("Next build: {}", project.counter));
    for container in &project.containers {
        output.container(container);
    }
    Ok(())
}
