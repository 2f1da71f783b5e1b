// ABOUTME: End-to-end tests of the orchestrator against in-memory backends.
// ABOUTME: Covers first deployments, redeployments, local syncs and failure reporting.

mod support;

use dockdev::config::ProjectConfig;
use dockdev::deploy::{
    ContainerStatus, DeployErrorKind, DeployOptions, DeploymentStatus, Orchestrator,
};
use dockdev::types::CleanName;
use support::{FakeMachines, FakeRuntime, FakeSync, MACHINE_IP, project, settings_with_token};

fn blog() -> CleanName {
    CleanName::new("blog").unwrap()
}

const WITH_PROXY: DeployOptions = DeployOptions {
    proxy: true,
    local: false,
};

/// Persist a finished deployment the way `dockdev deploy` does.
fn save_record(dir: &std::path::Path, record: &dockdev::deploy::DeploymentRecord) {
    let mut config = ProjectConfig::load(dir).unwrap();
    config.apply_record(record);
    config.save(dir).unwrap();
}

#[tokio::test]
async fn first_deploy_builds_server_zero_behind_proxy() {
    support::init_tracing();
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let orchestrator = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new(),
        FakeSync::new(),
        settings_with_token(home.path()),
    );

    let record = orchestrator
        .deploy(blog(), dir.path(), WITH_PROXY)
        .await
        .unwrap();

    assert_eq!(record.machine, "dockdev-blog");
    assert_eq!(record.ip_address.as_deref(), Some(MACHINE_IP));
    assert_eq!(record.status, DeploymentStatus::ContainersCreated);
    assert_eq!(record.counter, 1);

    let server = &record.containers[0];
    assert_eq!(server.name, "server0");
    assert_eq!(server.image, "dockdev/blog:0");
    assert!(server.server);
    assert_eq!(server.machine.as_deref(), Some("dockdev-blog"));
    assert!(server.docker_id.as_ref().is_some_and(|id| !id.is_empty()));

    let proxy = &record.containers[1];
    assert_eq!(proxy.name, "proxy");
    assert!(proxy.nginx);
    assert_eq!(proxy.status, ContainerStatus::Running);

    let calls = orchestrator.machines().calls();
    assert!(calls[0].starts_with("create dockdev-blog"));
    assert!(calls.contains(
        &"ssh dockdev-blog: docker build -t dockdev/blog:0 /root/dockdev/blog".to_string()
    ));

    let created = orchestrator.runtime().created();
    let server_env = created[0].1.env.clone().unwrap();
    assert_eq!(server_env, vec![format!("VIRTUAL_HOST={}", MACHINE_IP)]);

    let dockerfile = std::fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
    assert!(dockerfile.starts_with("From node:8\n"));
    assert_eq!(orchestrator.sync().calls().len(), 1);
}

#[tokio::test]
async fn redeploy_reuses_machine_and_proxy_with_fresh_tag() {
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let settings = settings_with_token(home.path());

    let first = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new(),
        FakeSync::new(),
        settings.clone(),
    );
    let record = first.deploy(blog(), dir.path(), WITH_PROXY).await.unwrap();
    save_record(dir.path(), &record);

    let second = Orchestrator::new(
        FakeMachines::new().with_machine("dockdev-blog"),
        FakeRuntime::new(),
        FakeSync::new(),
        settings,
    );
    let record = second.deploy(blog(), dir.path(), WITH_PROXY).await.unwrap();

    assert!(second.machines().creates().is_empty());
    assert_eq!(record.counter, 2);
    assert_eq!(record.containers.len(), 2);
    assert_eq!(record.containers[0].name, "server1");
    assert_eq!(record.containers[0].image, "dockdev/blog:1");
    // the proxy from the first run is kept, not created again
    assert_eq!(second.runtime().created_names(), vec!["server1"]);

    let dockerfile = std::fs::read_to_string(dir.path().join("Dockerfile")).unwrap();
    assert!(dockerfile.starts_with("From node:8\n"));
}

#[tokio::test]
async fn failed_build_leaves_counter_and_creates_nothing() {
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let orchestrator = Orchestrator::new(
        FakeMachines::new().failing_builds(),
        FakeRuntime::new(),
        FakeSync::new(),
        settings_with_token(home.path()),
    );

    let err = orchestrator
        .deploy(blog(), dir.path(), WITH_PROXY)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Build);
    assert_eq!(
        DeploymentStatus::from(&err),
        DeploymentStatus::Failed(DeployErrorKind::Build)
    );
    assert!(orchestrator.runtime().created().is_empty());
    assert_eq!(ProjectConfig::load(dir.path()).unwrap().counter, 0);
}

#[tokio::test]
async fn missing_token_never_reaches_the_backends() {
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let orchestrator = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new(),
        FakeSync::new(),
        support::settings_without_token(home.path()),
    );

    let err = orchestrator
        .deploy(blog(), dir.path(), DeployOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::MissingToken);
    assert!(orchestrator.machines().calls().is_empty());
    assert!(orchestrator.sync().calls().is_empty());
    assert!(!dir.path().join("Dockerfile").exists());
}

#[tokio::test]
async fn failed_container_still_advances_counter() {
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let settings = settings_with_token(home.path());

    let first = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new().failing_create_for("proxy"),
        FakeSync::new(),
        settings.clone(),
    );
    let err = first
        .deploy(blog(), dir.path(), WITH_PROXY)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::ContainerCreate);
    assert_eq!(first.runtime().created_names(), vec!["server0"]);
    assert_eq!(ProjectConfig::load(dir.path()).unwrap().counter, 1);

    let second = Orchestrator::new(
        FakeMachines::new().with_machine("dockdev-blog"),
        FakeRuntime::new(),
        FakeSync::new(),
        settings,
    );
    let record = second.deploy(blog(), dir.path(), WITH_PROXY).await.unwrap();

    assert!(second.machines().calls().contains(
        &"ssh dockdev-blog: docker build -t dockdev/blog:1 /root/dockdev/blog".to_string()
    ));
    assert_eq!(second.runtime().created_names(), vec!["server1", "proxy"]);
    assert_eq!(record.counter, 2);
    assert_eq!(ProjectConfig::load(dir.path()).unwrap().counter, 2);
}

#[tokio::test]
async fn replaced_machine_gets_every_container_again() {
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let settings = settings_with_token(home.path());

    let first = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new(),
        FakeSync::new(),
        settings.clone(),
    );
    let record = first.deploy(blog(), dir.path(), WITH_PROXY).await.unwrap();
    save_record(dir.path(), &record);

    // the backend no longer knows dockdev-blog
    let second = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new(),
        FakeSync::new(),
        settings,
    );
    let record = second.deploy(blog(), dir.path(), WITH_PROXY).await.unwrap();

    assert_eq!(second.machines().creates().len(), 1);
    assert_eq!(second.runtime().created_names(), vec!["server1", "proxy"]);
    let proxy = &record.containers[1];
    assert_eq!(proxy.docker_id.as_ref().map(|id| id.as_str()), Some("c002proxy"));
    assert_eq!(proxy.status, ContainerStatus::Running);
}

#[tokio::test]
async fn local_deploy_stops_after_sync() {
    let home = tempfile::tempdir().unwrap();
    let dir = project("blog", "node:8");
    let orchestrator = Orchestrator::new(
        FakeMachines::new(),
        FakeRuntime::new(),
        FakeSync::new(),
        settings_with_token(home.path()),
    );

    let record = orchestrator
        .deploy(
            blog(),
            dir.path(),
            DeployOptions {
                proxy: true,
                local: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(record.status, DeploymentStatus::Synced);
    assert_eq!(record.counter, 0);
    let syncs = orchestrator.sync().calls();
    assert_eq!(syncs.len(), 1);
    assert!(syncs[0].is_local());
    assert!(
        !orchestrator
            .machines()
            .calls()
            .iter()
            .any(|c| c.contains("docker build"))
    );
    assert!(orchestrator.runtime().created().is_empty());
    assert_eq!(ProjectConfig::load(dir.path()).unwrap().counter, 0);
}
