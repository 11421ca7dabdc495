//! Config file loading tests

use std::io::Write;
use std::time::Duration;
use window_stats::window::EvictionPolicy;
use window_stats::{Config, ConfigError};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
        [window]
        window_ms = 30000
        tick_interval_ms = 250
        eviction_policy = "gated"
        max_future_skew_ms = 1000

        [server]
        bind_addr = "0.0.0.0:9000"

        [log]
        filter = "debug"
        json = true
        "#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.window.window_ms, 30_000);
    assert_eq!(config.window.tick_interval, Duration::from_millis(250));
    assert_eq!(config.window.eviction_policy, EvictionPolicy::Gated);
    assert_eq!(config.window.max_future_skew_ms, Some(1_000));
    assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
    assert_eq!(config.server.max_line_bytes, 8 * 1024);
    assert!(config.log.json);
}

#[test]
fn test_load_empty_file_is_default() {
    let file = write_config("");
    assert_eq!(Config::load(file.path()).unwrap(), Config::default());
}

#[test]
fn test_load_rejects_invalid_window() {
    let file = write_config("[window]\nwindow_ms = -5\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_load_reports_parse_errors() {
    let file = write_config("[window\nwindow_ms = ");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("cannot parse config"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
