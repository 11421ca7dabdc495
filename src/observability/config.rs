//! Logging Configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: info)
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Apply `WINDOW_STATS_LOG_JSON` on top of this config
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("WINDOW_STATS_LOG_JSON") {
            self.json = v == "true" || v == "1";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }
}
