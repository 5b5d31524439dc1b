use crate::DEFAULT_SERVER_URL;
use crate::config::{ClientConfig, PASSWORD_ENV_VAR};
use crate::error::config::ConfigError;

use models::Credentials;

use std::time::Duration;

use log::LevelFilter;
use serial_test::serial;
use tempfile::TempDir;

/// **VALUE**: Verifies a missing file yields the defaults.
///
/// **WHY THIS MATTERS**: First run has no config; the client must still start.
#[test]
fn given_empty_dir_when_loading_then_defaults_are_returned() {
    // GIVEN: A directory with no config file
    let dir = TempDir::new().unwrap();

    // WHEN: Loading
    let config = ClientConfig::load(dir.path()).unwrap();

    // THEN: Defaults
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.server.url, DEFAULT_SERVER_URL);
    assert!(config.server.url.starts_with("wss://"));
    assert!(config.validate().is_ok());
    assert_eq!(config.typing_cooldown(), Duration::from_secs(5));
    assert_eq!(config.typing_display(), Duration::from_secs(4));
    assert_eq!(config.modes_settle(), Duration::from_millis(500));
    assert!(config.identity.guest);
}

/// **VALUE**: Verifies save then load gives back what was saved.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The temp file is left behind instead of renamed
/// - Optional fields are written as something TOML can't read back
#[test]
fn given_saved_config_when_loading_then_values_match() {
    // GIVEN: A non-default config saved to disk
    let dir = TempDir::new().unwrap();
    let mut config = ClientConfig::default();
    config.server.url = String::from("ws://chat.example.net:1300/");
    config.identity.nickname = Some(String::from("night-owl"));
    config.typing.cooldown_ms = 2500;
    config.logging.level = Some(String::from("debug"));
    config.save(dir.path()).unwrap();

    // WHEN: Loading it back
    let loaded = ClientConfig::load(dir.path()).unwrap();

    // THEN: Same values, no temp file
    assert_eq!(loaded, config);
    assert_eq!(loaded.log_level(), Some(LevelFilter::Debug));
    assert!(!dir.path().join("ichat.toml.tmp").exists());
}

#[test]
fn given_partial_file_when_loading_then_missing_fields_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        ClientConfig::file_path(dir.path()),
        "[typing]\ndisplay_ms = 1000\n",
    )
    .unwrap();

    let config = ClientConfig::load(dir.path()).unwrap();

    assert_eq!(config.typing.display_ms, 1000);
    assert_eq!(config.typing.cooldown_ms, 5000);
    assert_eq!(config.server, ClientConfig::default().server);
}

#[test]
fn given_malformed_file_when_loading_then_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(ClientConfig::file_path(dir.path()), "[server\nurl = ").unwrap();

    let result = ClientConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

/// **VALUE**: Verifies non-websocket urls are rejected.
///
/// **BUG THIS CATCHES**: Would catch an `http://` url reaching the socket
/// layer, where it fails with a much less helpful error.
#[test]
fn given_http_url_when_validating_then_validation_error() {
    let mut config = ClientConfig::default();
    config.server.url = String::from("http://127.0.0.1:1300/");

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
fn given_zero_windows_or_bad_level_when_validating_then_validation_error() {
    let mut zero_typing = ClientConfig::default();
    zero_typing.typing.cooldown_ms = 0;

    let mut zero_timeout = ClientConfig::default();
    zero_timeout.server.connect_timeout_secs = 0;

    let mut bad_level = ClientConfig::default();
    bad_level.logging.level = Some(String::from("loud"));

    for config in [zero_typing, zero_timeout, bad_level] {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));
    }
}

#[test]
fn given_guest_identity_when_building_credentials_then_guest_with_nickname() {
    let mut config = ClientConfig::default();
    config.identity.nickname = Some(String::from("night-owl"));

    let credentials = config.credentials().unwrap();

    assert_eq!(
        credentials,
        Credentials::Guest {
            nickname: Some(String::from("night-owl")),
        }
    );
}

/// **VALUE**: Verifies agent logins read the password from the environment.
///
/// **WHY THIS MATTERS**: The password must never be written to the config file.
#[test]
#[serial]
fn given_agent_identity_and_password_env_when_building_then_agent_credentials() {
    // GIVEN: Agent config and password in the environment
    let mut config = ClientConfig::default();
    config.identity.guest = false;
    config.identity.username = Some(String::from("ops"));
    // SAFETY: serialised with every other test touching this variable.
    unsafe { std::env::set_var(PASSWORD_ENV_VAR, "hunter2") };

    // WHEN: Building credentials
    let credentials = config.credentials();
    unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

    // THEN: Agent with nickname defaulted to username
    match credentials.unwrap() {
        Credentials::Agent {
            nickname,
            username,
            password,
        } => {
            assert_eq!(nickname, "ops");
            assert_eq!(username, "ops");
            assert_eq!(password.expose(), "hunter2");
        }
        other => panic!("expected agent, got {other:?}"),
    }
}

#[test]
#[serial]
fn given_agent_identity_without_password_env_when_building_then_environment_error() {
    let mut config = ClientConfig::default();
    config.identity.guest = false;
    config.identity.username = Some(String::from("ops"));
    unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

    let result = config.credentials();

    assert!(matches!(result, Err(ConfigError::Environment { .. })));
}

#[test]
#[serial]
fn given_agent_without_username_when_building_then_validation_error() {
    let mut config = ClientConfig::default();
    config.identity.guest = false;
    unsafe { std::env::set_var(PASSWORD_ENV_VAR, "hunter2") };

    let result = config.credentials();
    unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };

    assert!(matches!(result, Err(ConfigError::Validation { .. })));
}
