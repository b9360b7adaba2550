//! Integration tests for layered configuration
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use sentinelhub_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 5] = [
    "SH_BASE_URL",
    "SH_REQUEST_TIMEOUT",
    "SH_COVERAGE_TIMEOUT",
    "SH_USER_INFO_TIMEOUT",
    "SH_SETTINGS_PATH",
];

fn clear_env() {
    for name in ENV_VARS {
        env::remove_var(name);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    env::set_var("SH_BASE_URL", "https://services-uswest2.sentinel-hub.com");
    env::set_var("SH_COVERAGE_TIMEOUT", "25");
    env::set_var("SH_SETTINGS_PATH", "/tmp/env/settings.toml");

    let file = config_file(
        r#"
base_url = "https://file.example.com"
coverage_timeout = 15
request_timeout = 90
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.base_url.value, "https://services-uswest2.sentinel-hub.com");
    assert_eq!(config.base_url.source, ConfigSource::Environment);
    assert_eq!(config.coverage_timeout.value, 25);
    assert_eq!(config.coverage_timeout.source, ConfigSource::Environment);
    assert_eq!(config.request_timeout.value, 90);
    assert_eq!(config.request_timeout.source, ConfigSource::File);
    assert_eq!(config.settings_path.value, PathBuf::from("/tmp/env/settings.toml"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_values_are_ignored() {
    clear_env();
    env::set_var("SH_BASE_URL", "services.sentinel-hub.com");
    env::set_var("SH_REQUEST_TIMEOUT", "forever");
    env::set_var("SH_USER_INFO_TIMEOUT", "0");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.base_url.source, ConfigSource::Default);
    assert_eq!(config.request_timeout.value, 60);
    assert_eq!(config.request_timeout.source, ConfigSource::Default);
    assert_eq!(config.user_info_timeout.value, 10);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_all() {
    clear_env();
    env::set_var("SH_REQUEST_TIMEOUT", "45");

    let file = config_file("request_timeout = 30");

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    assert_eq!(config.request_timeout.value, 45);

    config.update_from_cli(CliConfigOverrides {
        request_timeout: Some(5),
        settings_path: Some(PathBuf::from("cli.toml")),
        ..Default::default()
    });

    assert_eq!(config.request_timeout.value, 5);
    assert_eq!(config.request_timeout.source, ConfigSource::Cli);
    assert_eq!(config.settings_path.value, PathBuf::from("cli.toml"));
    assert_eq!(config.base_url.source, ConfigSource::Default);

    assert!(ConfigSource::Cli.precedence() > ConfigSource::Environment.precedence());
    assert!(ConfigSource::Environment.precedence() > ConfigSource::File.precedence());
    assert!(ConfigSource::File.precedence() > ConfigSource::Default.precedence());

    clear_env();
}

#[test]
fn test_invalid_file() {
    let file = config_file("request_timeout = \"soon\"");
    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());

    assert!(LayeredConfig::with_defaults().load_from_file("/nonexistent/sh.toml").is_err());
}
