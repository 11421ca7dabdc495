pub mod config;
pub mod observability;
pub mod server;
pub mod window;

pub use config::{Config, ConfigError};
pub use window::{
    Clock, EvictionPolicy, EvictionScheduler, ManualClock, Stat, StatsEngine, SystemClock,
    Transaction, TransactionError, WindowConfig,
};
