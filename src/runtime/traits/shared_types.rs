// ABOUTME: The container-create payload handed to the runtime.
// ABOUTME: Serializes to the Docker Engine API shape (Env, HostConfig, ExposedPorts).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Runtime configuration for one container.
///
/// Maps are ordered so two configs built from the same inputs serialize
/// byte-for-byte identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: String,
    pub name: String,
    #[serde(rename = "Env", default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
    #[serde(rename = "HostConfig")]
    pub host_config: HostConfig,
    #[serde(rename = "ExposedPorts", default, skip_serializing_if = "Option::is_none")]
    pub exposed_ports: Option<BTreeMap<String, ExposedPort>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(rename = "NetworkMode", default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(rename = "Binds", default, skip_serializing_if = "Option::is_none")]
    pub binds: Option<Vec<String>>,
    #[serde(rename = "PortBindings", default, skip_serializing_if = "Option::is_none")]
    pub port_bindings: Option<BTreeMap<String, Vec<PortBinding>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    #[serde(rename = "HostPort")]
    pub host_port: String,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedPort {}
