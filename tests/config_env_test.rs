//! Environment variable overrides of the layered configuration

mod common;

use std::fs;

use runway::infrastructure::config::ConfigLoader;

use common::temp_dir;

#[test]
fn env_overrides_project_file() {
    let dir = temp_dir();
    fs::create_dir_all(dir.path().join(".runway")).unwrap();
    fs::write(
        ConfigLoader::project_config_path(dir.path()),
        "service:\n  port: 9000\n  host: api.internal\nsupervisor:\n  max_attempts: 2\n",
    )
    .unwrap();

    temp_env::with_vars(
        [
            ("RUNWAY_SERVICE__PORT", Some("9100")),
            ("RUNWAY_SUPERVISOR__READINESS_TIMEOUT_SECS", Some("30")),
        ],
        || {
            let config = ConfigLoader::load_from_dir(dir.path()).unwrap();
            assert_eq!(config.service.port, 9100);
            assert_eq!(config.service.host, "api.internal");
            assert_eq!(config.supervisor.max_attempts, 2);
            assert_eq!(config.supervisor.readiness_timeout_secs, 30);
        },
    );
}

#[test]
fn env_values_are_validated() {
    let dir = temp_dir();
    temp_env::with_var("RUNWAY_SUPERVISOR__MAX_ATTEMPTS", Some("0"), || {
        assert!(ConfigLoader::load_from_dir(dir.path()).is_err());
    });
}

#[test]
fn explicit_file_still_takes_env_overrides() {
    let dir = temp_dir();
    let path = dir.path().join("custom.yaml");
    fs::write(&path, "logging:\n  level: debug\nclient:\n  enabled: false\n").unwrap();

    temp_env::with_var("RUNWAY_LOGGING__LEVEL", Some("trace"), || {
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.logging.level, "trace");
        assert!(!config.client.enabled);
    });
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = temp_dir();
    assert!(ConfigLoader::load_from_file(dir.path().join("absent.yaml")).is_err());
}
