//! Process configuration
//!
//! Loaded from a TOML file, then overridden from environment variables:
//!
//! - `WINDOW_STATS_CONFIG`: path to the TOML file (optional; defaults otherwise)
//! - `WINDOW_STATS_BIND`: listen address
//! - `WINDOW_STATS_WINDOW_MS`: window length in milliseconds
//! - `WINDOW_STATS_TICK_MS`: eviction tick interval in milliseconds
//! - `WINDOW_STATS_LOG_JSON`: `true`/`1` for JSON logs
//!
//! ```toml
//! [window]
//! window_ms = 60000
//! tick_interval_ms = 1000
//! eviction_policy = "strict"
//!
//! [server]
//! bind_addr = "0.0.0.0:8080"
//!
//! [log]
//! filter = "info,window_stats=debug"
//! ```

use crate::observability::LogConfig;
use crate::server::ServerConfig;
use crate::window::WindowConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "cannot parse config {}: {}", path.display(), message)
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Config {
    /// Parse a TOML file. Does not consult the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `WINDOW_STATS_CONFIG` if set, then apply env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("WINDOW_STATS_CONFIG") {
            Ok(path) => Self::load(path)?,
            Err(_) => Config::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.server.apply_env();
        self.log.apply_env();

        if let Some(ms) = env_number::<i64>("WINDOW_STATS_WINDOW_MS")? {
            self.window.window_ms = ms;
        }
        if let Some(ms) = env_number::<u64>("WINDOW_STATS_TICK_MS")? {
            self.window.tick_interval = Duration::from_millis(ms);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window.validate().map_err(ConfigError::Invalid)?;
        if self.server.max_line_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_line_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{} is not a number: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}
