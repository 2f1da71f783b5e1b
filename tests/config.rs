// ABOUTME: Integration tests for settings, credentials and dockdev.json handling.
// ABOUTME: Uses temp-env for $HOME and tempfile for project directories.

use dockdev::config::*;
use dockdev::deploy::{Container, ContainerStatus, DeploymentRecord};
use dockdev::error::Error;
use dockdev::types::{CleanName, ContainerId};
use std::path::PathBuf;

mod settings {
    use super::*;

    #[test]
    fn resolves_settings_file_under_home() {
        temp_env::with_vars(
            [("HOME", Some("/home/dev")), (CONFIG_PATH_ENV, None::<&str>)],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(
                    settings.config_path,
                    PathBuf::from("/home/dev/.dockdev/config.json")
                );
                assert_eq!(
                    settings.known_hosts_path,
                    PathBuf::from("/home/dev/.dockdev/known_hosts")
                );
            },
        );
    }

    #[test]
    fn explicit_config_path_wins() {
        temp_env::with_vars(
            [
                ("HOME", Some("/home/dev")),
                (CONFIG_PATH_ENV, Some("/etc/dockdev/settings.json")),
            ],
            || {
                let settings = Settings::from_env().unwrap();
                assert_eq!(
                    settings.config_path,
                    PathBuf::from("/etc/dockdev/settings.json")
                );
            },
        );
    }

    #[test]
    fn missing_home_is_an_error() {
        temp_env::with_vars(
            [("HOME", None::<&str>), (CONFIG_PATH_ENV, None)],
            || {
                assert!(matches!(Settings::from_env(), Err(Error::InvalidConfig(_))));
            },
        );
    }

    #[test]
    fn project_paths() {
        let settings = Settings::new("/cfg/config.json")
            .remote_root("/srv/apps/")
            .local_root("/tmp/dd");
        let name = CleanName::new("blog").unwrap();
        assert_eq!(settings.remote_path(&name), "/srv/apps/blog");
        assert_eq!(settings.local_path(&name), PathBuf::from("/tmp/dd/blog"));

        let defaults = Settings::new("/cfg/config.json");
        assert_eq!(defaults.remote_path(&name), "/root/dockdev/blog");
        assert_eq!(defaults.local_path(&name), PathBuf::from("/tmp/dockdev/blog"));
    }
}

mod credentials {
    use super::*;

    #[test]
    fn reads_token_and_driver_overrides() {
        let config = LocalConfig::from_json(
            r#"{"DOToken": "abc123", "region": "ams3", "size": "s-1vcpu-1gb"}"#,
        )
        .unwrap();
        assert_eq!(config.token().unwrap().expose(), "abc123");
        assert_eq!(config.driver.region.as_deref(), Some("ams3"));
        assert_eq!(config.driver.size.as_deref(), Some("s-1vcpu-1gb"));
        assert_eq!(config.driver.image, None);
    }

    #[test]
    fn token_debug_output_is_redacted() {
        let token = AccessToken::new("abc123");
        assert!(!format!("{:?}", token).contains("abc123"));
    }

    #[test]
    fn missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = LocalConfig::load(&dir.path().join("config.json")).unwrap();
        assert!(config.token().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "DOToken=abc").unwrap();
        assert!(matches!(LocalConfig::load(&path), Err(Error::Json(_))));
    }
}

mod project {
    use super::*;

    #[test]
    fn init_seeds_single_server_from_directory_name() {
        let parent = tempfile::tempdir().unwrap();
        let dir = parent.path().join("My Shop");
        std::fs::create_dir(&dir).unwrap();

        let path = init_config(&dir, None, None, false).unwrap();
        assert_eq!(path, dir.join(PROJECT_FILENAME));

        let config = ProjectConfig::load(&dir).unwrap();
        assert_eq!(config.project_name, "My Shop");
        assert_eq!(config.clean_name.as_str(), "my-shop");
        assert_eq!(config.base_image.as_deref(), Some(DEFAULT_BASE_IMAGE));
        assert_eq!(config.counter, 0);
        assert_eq!(config.containers.len(), 1);
        assert!(config.containers[0].server);
        assert_eq!(config.containers[0].image, DEFAULT_BASE_IMAGE);
    }

    #[test]
    fn init_refuses_to_overwrite_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("blog"), None, false).unwrap();

        let err = init_config(dir.path(), Some("blog"), None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        init_config(dir.path(), Some("blog"), Some("node:20"), true).unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config.containers[0].image, "node:20");
    }

    #[test]
    fn load_without_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProjectConfig::load(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
    }

    #[test]
    fn discover_walks_up_to_project_root() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("blog"), None, false).unwrap();
        let nested = dir.path().join("src").join("routes");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(ProjectConfig::discover(&nested).unwrap(), dir.path());
    }

    #[test]
    fn parses_camel_case_file() {
        let config = ProjectConfig::from_json(
            r#"{
                "projectName": "Blog",
                "cleanName": "blog",
                "counter": 4,
                "machine": "dockdev-blog",
                "containers": [
                    {"cleanName": "blog", "image": "dockdev/blog:3", "name": "server3",
                     "server": true, "dockerId": "9c1e", "status": "running"},
                    {"cleanName": "blog", "image": "jwilder/nginx-proxy", "name": "proxy",
                     "nginx": true}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.counter, 4);
        assert_eq!(config.containers[0].docker_id, Some(ContainerId::new("9c1e")));
        assert_eq!(config.containers[0].status, ContainerStatus::Running);
        assert_eq!(config.containers[1].status, ContainerStatus::Pending);
        assert!(config.containers[1].nginx && !config.containers[1].server);
    }

    #[test]
    fn apply_record_takes_over_deployment_state() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("blog"), Some("node:8"), false).unwrap();
        let mut config = ProjectConfig::load(dir.path()).unwrap();

        let name = CleanName::new("blog").unwrap();
        let record = DeploymentRecord::new(name.clone(), dir.path())
            .with_counter(1)
            .with_containers(vec![Container::service(name, "db", "postgres:16")]);
        config.apply_record(&record);
        config.save(dir.path()).unwrap();

        let saved = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(saved.counter, 1);
        assert_eq!(saved.machine.as_deref(), Some("dockdev-blog"));
        assert_eq!(saved.containers[0].name, "db");
        assert_eq!(saved.base_image.as_deref(), Some("node:8"));
    }
}
