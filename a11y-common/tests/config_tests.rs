//! Configuration resolution tests
//!
//! Covers the config file priority order (command line → environment →
//! platform file → defaults) and graceful fallback to compiled defaults.
//!
//! Note: Uses serial_test to prevent environment variable races. Tests that
//! touch A11Y_CONFIG are marked #[serial].

use a11y_common::config::{TomlConfig, CONFIG_ENV_VAR};
use a11y_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    let dir = TempDir::new().unwrap();
    let cli_path = write_config(&dir, "cli.toml", "[server]\nport = 6001\n");
    let env_path = write_config(&dir, "env.toml", "[server]\nport = 6002\n");

    env::set_var(CONFIG_ENV_VAR, &env_path);
    let config = TomlConfig::load(Some(&cli_path)).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.server.port, 6001);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    let dir = TempDir::new().unwrap();
    let env_path = write_config(
        &dir,
        "env.toml",
        "[audit]\nmax_concurrent_audits = 4\n[logging]\nlevel = \"debug\"\n",
    );

    env::set_var(CONFIG_ENV_VAR, &env_path);
    let config = TomlConfig::load(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.audit.max_concurrent_audits, 4);
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_missing_cli_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let result = TomlConfig::load(Some(&missing));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_values_in_file_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[database]\nmax_connections = 0\n");

    let result = TomlConfig::load(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");
    let result = TomlConfig::load(None);
    env::remove_var(CONFIG_ENV_VAR);

    // Falls through to the platform file or compiled defaults
    assert!(result.is_ok());
}
