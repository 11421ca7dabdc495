//! Window Configuration
//!
//! Window length and eviction cadence are parameters rather than constants so
//! tests can shrink them; the defaults are a 60 second window ticked once a second.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_WINDOW_MS: i64 = 60_000;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1_000);

/// When the eviction scan runs on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Scan for expired transactions on every tick
    #[default]
    Strict,
    /// Scan only once the window-start marker has itself aged past the window.
    /// Entries that expire while the marker is still young linger until then.
    Gated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Trailing window length in milliseconds (default: 60,000)
    pub window_ms: i64,
    /// Eviction tick interval (default: 1s)
    #[serde(rename = "tick_interval_ms", with = "duration_millis")]
    pub tick_interval: Duration,
    pub eviction_policy: EvictionPolicy,
    /// Reject timestamps more than this far ahead of now. `None` disables the check.
    pub max_future_skew_ms: Option<i64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            window_ms: DEFAULT_WINDOW_MS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            eviction_policy: EvictionPolicy::Strict,
            max_future_skew_ms: None,
        }
    }
}

impl WindowConfig {
    /// Configuration for tests (short window, fast ticks)
    pub fn test() -> Self {
        WindowConfig {
            window_ms: 1_000,
            tick_interval: Duration::from_millis(10),
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    pub fn with_max_future_skew(mut self, skew_ms: i64) -> Self {
        self.max_future_skew_ms = Some(skew_ms);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.window_ms <= 0 {
            return Err(format!("window_ms must be positive, got {}", self.window_ms));
        }
        if self.tick_interval.is_zero() {
            return Err("tick_interval_ms must be positive".to_string());
        }
        if let Some(skew) = self.max_future_skew_ms {
            if skew < 0 {
                return Err(format!("max_future_skew_ms must not be negative, got {}", skew));
            }
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WindowConfig::default();
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.eviction_policy, EvictionPolicy::Strict);
        assert!(config.max_future_skew_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = WindowConfig::default();
        config.window_ms = 0;
        assert!(config.validate().is_err());

        let mut config = WindowConfig::default();
        config.tick_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let config = WindowConfig::default().with_max_future_skew(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_uses_millis() {
        let config = WindowConfig::test().with_policy(EvictionPolicy::Gated);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["tick_interval_ms"], 10);
        assert_eq!(json["eviction_policy"], "gated");

        let back: WindowConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
