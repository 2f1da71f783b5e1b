// ABOUTME: Tests for Dockerfile materialization.
// ABOUTME: The template text is checked byte for byte.

use dockdev::deploy::{
    Container, DOCKERFILE_NAME, DeployErrorKind, create_dockerfile, dockerfile_contents,
};
use dockdev::types::CleanName;

fn server(image: &str) -> Container {
    Container::server(CleanName::new("blog").unwrap(), image)
}

#[test]
fn template_is_fixed_apart_from_base_image() {
    assert_eq!(
        dockerfile_contents("node:8"),
        "From node:8\n\
         COPY . /app\n\
         WORKDIR /app\n\
         RUN [\"npm\", \"install\", \"--production\"]\n\
         EXPOSE 3000\n\
         CMD [\"npm\", \"start\"]\n"
    );
}

#[tokio::test]
async fn writes_dockerfile_for_server_container() {
    let dir = tempfile::tempdir().unwrap();
    let db = Container::service(CleanName::new("blog").unwrap(), "db", "mongo:4");

    let path = create_dockerfile(&[db, server("node:8")], dir.path())
        .await
        .unwrap();

    assert_eq!(path, dir.path().join(DOCKERFILE_NAME));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        dockerfile_contents("node:8")
    );
}

#[tokio::test]
async fn unwritable_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = create_dockerfile(&[server("node:8")], &missing)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DeployErrorKind::Dockerfile);
    assert!(err.to_string().starts_with("Dockerfile creation failed"));
}

#[tokio::test]
async fn no_server_container_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = Container::service(CleanName::new("blog").unwrap(), "db", "mongo:4");

    let err = create_dockerfile(&[db], dir.path()).await.unwrap_err();
    assert_eq!(err.kind(), DeployErrorKind::InvalidContainers);
    assert!(!dir.path().join(DOCKERFILE_NAME).exists());
}
