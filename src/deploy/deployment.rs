// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Wraps the deployment record that every transition hands forward.

use super::record::DeploymentRecord;
use super::state::Unprovisioned;
use crate::types::CleanName;
use std::path::PathBuf;

/// A deployment in progress, parameterized by its current state.
///
/// Transitions consume the deployment and return the next state, so a
/// step can only run once its predecessors have succeeded.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) record: DeploymentRecord,
    pub(crate) state: S,
}

impl Deployment<Unprovisioned> {
    pub fn new(clean_name: CleanName, base_path: impl Into<PathBuf>) -> Self {
        Deployment {
            record: DeploymentRecord::new(clean_name, base_path),
            state: Unprovisioned,
        }
    }
}

impl<S> Deployment<S> {
    pub fn record(&self) -> &DeploymentRecord {
        &self.record
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn machine(&self) -> &str {
        &self.record.machine
    }
}
