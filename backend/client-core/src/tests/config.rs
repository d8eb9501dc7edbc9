// Unit tests for client configuration
// Tests defaults, validation, persistence, and the env override

use crate::config::{BASE_URL_ENV_VAR, ClientConfig};

use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: Verifies a missing config file yields working defaults.
///
/// **WHY THIS MATTERS**: First launch has no config; the client must come up
/// pointed at the default backend rather than erroring.
#[test]
#[serial]
fn given_missing_file_when_loading_then_defaults_used() {
    let dir = TempDir::new().unwrap();

    let config = ClientConfig::load(dir.path()).expect("load should succeed");

    assert_eq!(config.server.base_url, crate::TASKLINE_SERVER_BASE_URL);
    assert_eq!(
        config.server.request_timeout_secs,
        crate::DEFAULT_REQUEST_TIMEOUT_SECS
    );
}

/// **VALUE**: Verifies save -> load round-trips through the JSON file.
#[test]
#[serial]
fn given_saved_config_when_loading_then_values_survive() {
    let dir = TempDir::new().unwrap();
    let mut config = ClientConfig::default();
    config.server.base_url = String::from("https://tasks.example.com");

    config.save(dir.path()).expect("save should succeed");
    let loaded = ClientConfig::load(dir.path()).expect("load should succeed");

    assert_eq!(loaded.server.base_url, "https://tasks.example.com");
}

/// **VALUE**: Verifies a corrupt config file is an error, not a silent
/// fallback.
///
/// **WHY THIS MATTERS**: Unlike the credential file (where "absent" is a
/// safe default), silently ignoring a corrupt config would point the client
/// at the wrong backend without telling anyone.
#[test]
#[serial]
fn given_corrupt_file_when_loading_then_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), b"{ nope").unwrap();

    assert!(ClientConfig::load(dir.path()).is_err());
}

/// **VALUE**: Verifies validation rejects URLs the pipeline cannot use.
///
/// **BUG THIS CATCHES**: Would catch a config edit like `base_url = "ftp://"`
/// surviving until the first request mysteriously fails.
#[test]
fn given_invalid_values_when_validating_then_rejected() {
    let mut config = ClientConfig::default();
    config.server.base_url = String::from("ftp://tasks.example.com");
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.server.base_url = String::new();
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.server.request_timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.version = 0;
    assert!(config.validate().is_err());
}

/// **VALUE**: Verifies the environment override beats the config file.
///
/// **WHY THIS MATTERS**: Dev shells point at local backends via
/// TASKLINE_BASE_URL without editing the persisted config.
#[test]
#[serial]
fn given_env_override_when_loading_then_env_wins() {
    let dir = TempDir::new().unwrap();
    let mut config = ClientConfig::default();
    config.server.base_url = String::from("https://configured.example.com");
    config.save(dir.path()).unwrap();

    // SAFETY: #[serial] guards concurrent env mutation across tests.
    unsafe { std::env::set_var(BASE_URL_ENV_VAR, "http://127.0.0.1:9999") };
    let loaded = ClientConfig::load(dir.path());
    unsafe { std::env::remove_var(BASE_URL_ENV_VAR) };

    assert_eq!(loaded.unwrap().server.base_url, "http://127.0.0.1:9999");
}
