// ABOUTME: Init command implementation.
// ABOUTME: Scaffolds dockdev.json in the working directory.

use dockdev::config::init_config;
use dockdev::error::Result;
use dockdev::output::Output;

pub fn init(name: Option<&str>, image: Option<&str>, force: bool, output: &Output) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = init_config(&cwd, name, image, force)?;
    output.success(&format!("Created {}", path.display()));
    Ok(())
}
