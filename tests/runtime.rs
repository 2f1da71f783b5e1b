// ABOUTME: Tests for runtime payload types and connection errors.
// ABOUTME: The bollard client itself needs a live daemon and is not exercised here.

use dockdev::machine::MachineError;
use dockdev::runtime::{
    ConnectError, ConnectErrorKind, ContainerConfig, ExposedPort, HostConfig, PortBinding,
};
use std::collections::BTreeMap;

#[test]
fn connect_error_kind_and_machine() {
    let err = ConnectError::Inspect {
        machine: "dockdev-blog".to_string(),
        source: MachineError::InvalidInspect {
            machine: "dockdev-blog".to_string(),
            reason: "machine has no IP address".to_string(),
        },
    };
    assert_eq!(err.kind(), ConnectErrorKind::Inspect);
    assert_eq!(err.machine(), "dockdev-blog");
    assert!(err.to_string().contains("cannot inspect machine dockdev-blog"));

    let err = ConnectError::Tunnel {
        machine: "dockdev-shop".to_string(),
        source: dockdev::ssh::Error::SocketForwardFailed("bind".to_string()),
    };
    assert_eq!(err.kind(), ConnectErrorKind::Tunnel);
}

#[test]
fn container_config_round_trips_engine_shape() {
    let json = r#"{
        "image": "jwilder/nginx-proxy",
        "name": "proxy",
        "HostConfig": {
            "Binds": ["/var/run/docker.sock:/tmp/docker.sock:ro"],
            "PortBindings": {"80/tcp": [{"HostPort": "80"}]}
        },
        "ExposedPorts": {"80/tcp": {}}
    }"#;
    let config: ContainerConfig = serde_json::from_str(json).unwrap();

    assert_eq!(
        config,
        ContainerConfig {
            image: "jwilder/nginx-proxy".to_string(),
            name: "proxy".to_string(),
            env: None,
            host_config: HostConfig {
                network_mode: None,
                binds: Some(vec!["/var/run/docker.sock:/tmp/docker.sock:ro".to_string()]),
                port_bindings: Some(BTreeMap::from([(
                    "80/tcp".to_string(),
                    vec![PortBinding {
                        host_port: "80".to_string()
                    }]
                )])),
            },
            exposed_ports: Some(BTreeMap::from([("80/tcp".to_string(), ExposedPort {})])),
        }
    );
}
