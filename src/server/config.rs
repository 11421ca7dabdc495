//! Front-end configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (default: 127.0.0.1:8080)
    pub bind_addr: String,
    /// Longest request line accepted before the connection is dropped
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            max_line_bytes: 8 * 1024,
        }
    }
}

impl ServerConfig {
    /// Apply `WINDOW_STATS_BIND` on top of this config
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("WINDOW_STATS_BIND") {
            self.bind_addr = addr;
        }
    }
}
