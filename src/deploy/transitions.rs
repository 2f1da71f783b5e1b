// ABOUTME: State transition methods for the deployment pipeline.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::config::{ProjectConfig, Settings};
use crate::machine::MachineOps;
use crate::runtime::{ContainerRuntime, ImageOps, NetworkError, NetworkOps};
use crate::sync::{FileSync, SyncArgs, sync_source};
use crate::types::CleanName;
use std::path::{Path, PathBuf};

use super::Deployment;
use super::containers::{
    add_nginx_container, create_remote_container, remote_server_obj, start_remote_container,
};
use super::dockerfile::create_dockerfile;
use super::error::DeployError;
use super::record::{Container, ContainerStatus, DeploymentRecord, DeploymentStatus};
use super::state::{ContainersCreated, ImageBuilt, Provisioned, Synced, Unprovisioned};

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Deployment<S> {
    fn transition<T>(self, state: T, status: DeploymentStatus) -> Deployment<T> {
        Deployment {
            record: self.record.with_status(status),
            state,
        }
    }
}

/// Create the project's private network. An existing one is reused.
async fn ensure_network<N: NetworkOps + ?Sized>(
    networks: &N,
    record: &DeploymentRecord,
) -> Result<String, DeployError> {
    let name = record.network_name();
    match networks.create_network(&record.machine, name).await {
        Ok(id) => {
            tracing::info!("network {} ready on {}", name, record.machine);
            Ok(id)
        }
        Err(NetworkError::AlreadyExists(_)) => {
            tracing::warn!("network {} already exists on {}", name, record.machine);
            Ok(name.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

/// Pull `image` onto the machine unless it is already there.
async fn ensure_image<R: ImageOps + ?Sized>(
    runtime: &R,
    machine: &str,
    image: &str,
) -> Result<(), DeployError> {
    if runtime.image_exists(machine, image).await? {
        tracing::debug!("image {} present on {}", image, machine);
        return Ok(());
    }
    tracing::info!("pulling {} on {}", image, machine);
    runtime.pull_image(machine, image).await?;
    Ok(())
}

// =============================================================================
// Step functions
// =============================================================================

/// Provision the machine and private network for a project.
///
/// The access token is checked before anything else; without one no remote
/// call is made.
///
/// # Errors
///
/// Returns `DeployError::MissingToken` if the settings file has no token,
/// `DeployError::ProjectConfig` if dockdev.json cannot be read or written,
/// `DeployError::Provision` if the machine cannot be created and
/// `DeployError::Network` if the network cannot be created.
pub async fn init_remote<M, N>(
    machines: &M,
    networks: &N,
    settings: &Settings,
    clean_name: CleanName,
    path: impl Into<PathBuf>,
) -> Result<Deployment<Provisioned>, DeployError>
where
    M: MachineOps + ?Sized,
    N: NetworkOps + ?Sized,
{
    Deployment::new(clean_name, path)
        .provision(machines, networks, settings)
        .await
}

/// Copy the project directory to the machine, or to the local testing
/// directory when `local` is set, and record the machine's address.
///
/// # Errors
///
/// Returns `DeployError::Sync` if the machine cannot be inspected or the
/// transfer fails.
pub async fn sync_files_to_remote<M, F>(
    machines: &M,
    sync: &F,
    settings: &Settings,
    record: DeploymentRecord,
    local: bool,
) -> Result<DeploymentRecord, DeployError>
where
    M: MachineOps + ?Sized,
    F: FileSync + ?Sized,
{
    let source = sync_source(&record.base_path);
    let destination = if local {
        settings
            .local_path(&record.clean_name)
            .to_string_lossy()
            .into_owned()
    } else {
        settings.remote_path(&record.clean_name)
    };

    let info = machines
        .inspect(&record.machine)
        .await
        .map_err(|e| DeployError::Sync(e.to_string()))?;

    let args = SyncArgs::new(source, destination, &info, local);
    sync.sync(&args)
        .await
        .map_err(|e| DeployError::Sync(e.to_string()))?;

    Ok(record.with_ip_address(info.ip_address))
}

/// Build the server image from the synchronized project directory.
/// Returns the image tag. The counter is not touched.
///
/// # Errors
///
/// Returns `DeployError::Build` if the command cannot be run or exits
/// non-zero.
pub async fn build_server_image<M: MachineOps + ?Sized>(
    machines: &M,
    settings: &Settings,
    record: &DeploymentRecord,
) -> Result<String, DeployError> {
    let tag = record.server_image_tag();
    let context = settings.remote_path(&record.clean_name);
    let command = format!("docker build -t {} {}", tag, context);

    tracing::info!("building {} on {}", tag, record.machine);
    let output = machines
        .ssh(&record.machine, &command)
        .await
        .map_err(|e| DeployError::Build(e.to_string()))?;

    if !output.success() {
        return Err(DeployError::Build(format!(
            "`{}` exited with status {}: {}",
            command,
            output.exit_code,
            output.stderr.trim()
        )));
    }

    tracing::info!("built {}", tag);
    Ok(tag)
}

// =============================================================================
// Unprovisioned -> Provisioned
// =============================================================================

impl Deployment<Unprovisioned> {
    /// Create the machine, persist its name to dockdev.json and create the
    /// private network. Stops at the first failure.
    ///
    /// A machine recorded in dockdev.json by an earlier deployment is reused
    /// as long as the backend still knows it. Otherwise containers recorded
    /// on the old machine are reset to pending.
    ///
    /// # Errors
    ///
    /// See [`init_remote`].
    #[must_use = "deployment state must be used"]
    pub async fn provision<M, N>(
        self,
        machines: &M,
        networks: &N,
        settings: &Settings,
    ) -> Result<Deployment<Provisioned>, DeployError>
    where
        M: MachineOps + ?Sized,
        N: NetworkOps + ?Sized,
    {
        let local = settings
            .load_local_config()
            .map_err(|e| DeployError::LocalConfig(e.to_string()))?;
        let token = local.token().ok_or_else(|| {
            DeployError::MissingToken(settings.config_path.display().to_string())
        })?;

        let base_path = self.record.base_path.clone();
        let mut project = ProjectConfig::load(&base_path)
            .map_err(|e| DeployError::ProjectConfig(e.to_string()))?;
        if project.clean_name != self.record.clean_name {
            tracing::warn!(
                "dockdev.json names {}, deploying as {}",
                project.clean_name,
                self.record.clean_name
            );
        }

        let mut record = self.record.with_project(&project);
        record.validate_containers()?;

        let existing = match project.machine.as_deref() {
            Some(name) if name == record.machine => machines.inspect(name).await.is_ok(),
            _ => false,
        };
        if existing {
            tracing::info!("reusing machine {}", record.machine);
        } else {
            tracing::info!("provisioning machine {}", record.machine);
            machines
                .create_machine(&record.machine, &token, &local.driver)
                .await
                .map_err(|e| DeployError::Provision(e.to_string()))?;
            record = record.without_placements();
        }

        project.machine = Some(record.machine.clone());
        project
            .save(&base_path)
            .map_err(|e| DeployError::ProjectConfig(e.to_string()))?;

        let network = ensure_network(networks, &record).await?;
        tracing::debug!("network {} has id {}", record.network_name(), network);

        Ok(Deployment {
            record: record.with_status(DeploymentStatus::Provisioned),
            state: Provisioned,
        })
    }
}

// =============================================================================
// Provisioned -> Synced
// =============================================================================

impl Deployment<Provisioned> {
    /// Write the server's Dockerfile into the project directory so the next
    /// sync ships it with the build context.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Dockerfile` if the file cannot be written.
    pub async fn write_dockerfile(&self) -> Result<PathBuf, DeployError> {
        create_dockerfile(&self.record.containers, &self.record.base_path).await
    }

    /// # Errors
    ///
    /// See [`sync_files_to_remote`].
    #[must_use = "deployment state must be used"]
    pub async fn sync_files<M, F>(
        self,
        machines: &M,
        sync: &F,
        settings: &Settings,
        local: bool,
    ) -> Result<Deployment<Synced>, DeployError>
    where
        M: MachineOps + ?Sized,
        F: FileSync + ?Sized,
    {
        let record = sync_files_to_remote(machines, sync, settings, self.record, local).await?;
        Ok(Deployment {
            record: record.with_status(DeploymentStatus::Synced),
            state: Synced,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.record.base_path
    }
}

// =============================================================================
// Synced -> ImageBuilt
// =============================================================================

impl Deployment<Synced> {
    /// # Errors
    ///
    /// See [`build_server_image`].
    #[must_use = "deployment state must be used"]
    pub async fn build_image<M: MachineOps + ?Sized>(
        self,
        machines: &M,
        settings: &Settings,
    ) -> Result<Deployment<ImageBuilt>, DeployError> {
        build_server_image(machines, settings, &self.record).await?;
        let counter = self.record.counter;
        Ok(self.transition(ImageBuilt::new(counter), DeploymentStatus::ImageBuilt))
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.record.ip_address.as_deref()
    }
}

// =============================================================================
// ImageBuilt -> ContainersCreated
// =============================================================================

impl Deployment<ImageBuilt> {
    /// The containers this deployment will create, in order: the project's
    /// list with its server entry swapped for the freshly built one, plus
    /// the proxy at the end when requested and not yet present.
    pub fn planned_containers(&self, with_proxy: bool) -> Result<Vec<Container>, DeployError> {
        let server = remote_server_obj(&self.record);
        let planned: Vec<Container> = self
            .record
            .containers
            .iter()
            .map(|c| if c.server { server.clone() } else { c.clone() })
            .collect();

        if with_proxy && !self.record.has_proxy() {
            add_nginx_container(&planned, &self.record)
        } else {
            Ok(planned)
        }
    }

    /// Create and start every planned container on the machine. Entries
    /// that already exist from an earlier deployment are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::ImagePull`, `DeployError::ContainerCreate` or
    /// `DeployError::ContainerStart` for the first container that fails;
    /// later containers are not attempted.
    #[must_use = "deployment state must be used"]
    pub async fn create_containers<R: ContainerRuntime + ?Sized>(
        self,
        runtime: &R,
        with_proxy: bool,
    ) -> Result<Deployment<ContainersCreated>, DeployError> {
        let planned = self.planned_containers(with_proxy)?;
        let record = &self.record;
        let mut created = Vec::with_capacity(planned.len());

        for container in &planned {
            if container.docker_id.is_some() && container.status != ContainerStatus::Pending {
                tracing::info!("{} already exists, skipping", container.name);
                created.push(container.clone());
                continue;
            }

            // the server image was just built on the machine
            if !container.server {
                ensure_image(runtime, &record.machine, &container.image).await?;
            }

            let container = Container {
                status: ContainerStatus::Created,
                ..create_remote_container(runtime, container, record).await?
            };
            let container = start_remote_container(runtime, &container, record).await?;
            created.push(container);
        }

        let deployment = Deployment {
            record: self.record.with_containers(created),
            state: self.state,
        };
        Ok(deployment.transition(ContainersCreated, DeploymentStatus::ContainersCreated))
    }
}

// =============================================================================
// ContainersCreated
// =============================================================================

impl Deployment<ContainersCreated> {
    /// Hand back the final record.
    pub fn finish(self) -> DeploymentRecord {
        self.record
    }
}
