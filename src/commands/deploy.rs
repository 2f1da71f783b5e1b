// ABOUTME: Deploy command implementation.
// ABOUTME: Wires the docker-machine, bollard and rsync backends into the orchestrator.

use super::project_dir;
use dockdev::config::{ProjectConfig, Settings};
use dockdev::deploy::{DeployOptions, Orchestrator};
use dockdev::error::Result;
use dockdev::machine::DockerMachine;
use dockdev::output::Output;
use dockdev::runtime::RemoteDocker;
use dockdev::sync::Rsync;
use std::path::Path;

pub async fn deploy(path: Option<&Path>, options: DeployOptions, mut output: Output) -> Result<()> {
    let dir = project_dir(path)?;
    let project = ProjectConfig::load(&dir)?;
    let settings = Settings::from_env()?;

    output.start_timer();
    output.progress(&format!(
        "Deploying {} from {}",
        project.project_name,
        dir.display()
    ));
    if options.local {
        output.warning(&format!(
            "syncing into {} instead of the machine",
            settings.local_path(&project.clean_name).display()
        ));
    }

    let machines = DockerMachine::new().known_hosts_path(&settings.known_hosts_path);
    let runtime =
        RemoteDocker::new(machines.clone()).known_hosts_path(&settings.known_hosts_path);
    let orchestrator = Orchestrator::new(machines, runtime, Rsync::new(), settings);

    let result = orchestrator
        .deploy(project.clean_name.clone(), &dir, options)
        .await;
    orchestrator.runtime().disconnect_all().await;
    let record = result?;

    // reload: provisioning and the build rewrote the file
    let mut project = ProjectConfig::load(&dir)?;
    project.apply_record(&record);
    project.save(&dir)?;

    if options.local {
        let local_path = orchestrator.settings().local_path(&record.clean_name);
        output.success(&format!(
            "Synced {} into {}",
            record.clean_name,
            local_path.display()
        ));
        return Ok(());
    }

    for container in &record.containers {
        output.container(container);
    }

    let address = record.ip_address.as_deref().unwrap_or(record.machine.as_str());
    output.success(&format!("Deployed {} to {}", record.clean_name, address));
    Ok(())
}
