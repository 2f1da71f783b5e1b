// ABOUTME: Runs the deployment steps in order against concrete backends.
// ABOUTME: The only place that advances the project's build counter.

use super::Deployment;
use super::error::DeployError;
use super::record::{DeploymentRecord, DeploymentStatus};
use crate::config::{ProjectConfig, Settings};
use crate::machine::MachineOps;
use crate::runtime::ContainerRuntime;
use crate::sync::FileSync;
use crate::types::CleanName;
use std::path::{Path, PathBuf};

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Put the reverse proxy in front of the server.
    pub proxy: bool,
    /// Sync into the local testing directory instead of the machine and
    /// stop there; nothing is built or created.
    pub local: bool,
}

/// Sequences provisioning, Dockerfile, sync, build and container creation.
pub struct Orchestrator<M, R, F> {
    machines: M,
    runtime: R,
    sync: F,
    settings: Settings,
}

impl<M, R, F> Orchestrator<M, R, F>
where
    M: MachineOps,
    R: ContainerRuntime,
    F: FileSync,
{
    pub fn new(machines: M, runtime: R, sync: F, settings: Settings) -> Self {
        Self {
            machines,
            runtime,
            sync,
            settings,
        }
    }

    pub fn machines(&self) -> &M {
        &self.machines
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn sync(&self) -> &F {
        &self.sync
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Deploy the project in `path`. On success the returned record holds
    /// the created containers and a counter one past the image just built.
    ///
    /// The advanced counter is written to dockdev.json as soon as the image
    /// is built, so a later failure never leaves the tag to be reused.
    ///
    /// # Errors
    ///
    /// Returns the first step's `DeployError`; nothing after it runs.
    pub async fn deploy(
        &self,
        clean_name: CleanName,
        path: impl Into<PathBuf>,
        options: DeployOptions,
    ) -> Result<DeploymentRecord, DeployError> {
        match self.run(clean_name.clone(), path.into(), options).await {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::error!(
                    "deployment of {} ended {}: {}",
                    clean_name,
                    DeploymentStatus::from(&e),
                    e
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        clean_name: CleanName,
        path: PathBuf,
        options: DeployOptions,
    ) -> Result<DeploymentRecord, DeployError> {
        let provisioned = Deployment::new(clean_name, path)
            .provision(&self.machines, &self.runtime, &self.settings)
            .await?;

        provisioned.write_dockerfile().await?;

        let synced = provisioned
            .sync_files(&self.machines, &self.sync, &self.settings, options.local)
            .await?;

        if options.local {
            tracing::info!(
                "{} synced into {}, skipping build",
                synced.record().clean_name,
                self.settings.local_path(&synced.record().clean_name).display()
            );
            return Ok(synced.record().clone());
        }

        let built = synced.build_image(&self.machines, &self.settings).await?;
        let next = built.state().counter() + 1;
        advance_counter(&built.record().base_path, next)?;

        let record = built
            .create_containers(&self.runtime, options.proxy)
            .await?
            .finish();

        tracing::info!(
            "{} deployed with {} container(s)",
            record.clean_name,
            record.containers.len()
        );
        Ok(record.with_counter(next))
    }
}

fn advance_counter(dir: &Path, counter: u64) -> Result<(), DeployError> {
    let mut project =
        ProjectConfig::load(dir).map_err(|e| DeployError::ProjectConfig(e.to_string()))?;
    project.counter = counter;
    project
        .save(dir)
        .map_err(|e| DeployError::ProjectConfig(e.to_string()))?;
    tracing::debug!("next build counter {}", counter);
    Ok(())
}
