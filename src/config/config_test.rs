use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_engine_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("TENGINE__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = EngineConfig::default();

    assert_eq!(config.execution.default_cluster, "ceph");
    assert_eq!(config.execution.default_timeout_secs, 1800);
    assert!(config.execution.parallel_dispatch);
    assert_eq!(config.ssh.user, "cephuser");
    assert_eq!(config.ssh.port, 22);
    assert!(!config.ssh.strict_host_key_checking);
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_engine_env_vars();
    with_vars(
        vec![("TENGINE__EXECUTION__DEFAULT_TIMEOUT_SECS", Some("300"))],
        || {
            let config = EngineConfig::new().unwrap();

            assert_eq!(config.execution.default_timeout_secs, 300);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_engine_env_vars();
    // Create temporary directory and configuration file
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("dynamic_config.toml");

    // Dynamically generate TOML configuration content
    std::fs::write(
        &config_path,
        r#"
        [execution]
        default_cluster = "ceph-pri" # Override default value

        [ssh]
        user = "qa" # Override default value
        port = 2222 # Add new field
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = EngineConfig::new().expect("success");
        let result = base_config.with_override_config(config_path.to_str().unwrap());

        assert!(result.is_ok());
        let config = result.unwrap();

        assert_eq!(config.execution.default_cluster, "ceph-pri");
        assert_eq!(config.ssh.user, "qa");
        assert_eq!(config.ssh.port, 2222);
        // Untouched sections keep their defaults
        assert_eq!(config.execution.default_timeout_secs, 1800);
    });
}

#[test]
fn validation_should_fail_with_empty_default_cluster() {
    let mut config = EngineConfig::default();
    config.execution.default_cluster = String::new();

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_fail_with_zero_timeout() {
    let mut config = EngineConfig::default();
    config.execution.default_timeout_secs = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_detect_invalid_ssh_settings() {
    let mut config = EngineConfig::default();
    config.ssh.port = 0;

    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_engine_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("test_config.toml");
    std::fs::write(
        &config_path,
        r#"
        [execution]
        default_cluster = "from-file"
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("TENGINE__EXECUTION__DEFAULT_CLUSTER", Some("from-env")),
        ],
        || {
            let config = EngineConfig::new().unwrap();

            assert_eq!(config.execution.default_cluster, "from-env");
        },
    );
}

#[test]
#[serial]
fn config_should_handle_nested_structures_correctly() {
    cleanup_all_engine_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("nested.toml");
    std::fs::write(
        &config_path,
        r#"
        [logging]
        log_dir = "/tmp/qa-logs"
        file_prefix = "rgw-multisite"
        "#,
    )
    .unwrap();

    with_vars(
        vec![("CONFIG_PATH", Some(config_path.to_str().unwrap()))],
        || {
            let config = EngineConfig::new().unwrap();
            assert_eq!(
                config.logging.log_file_path().to_str(),
                Some("/tmp/qa-logs/rgw-multisite.log")
            );
        },
    );
}
