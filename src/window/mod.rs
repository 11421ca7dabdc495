//! Sliding-Window Aggregation
//!
//! Maintains sum, average, min, max and count over a trailing window of
//! transactions, answering reads in O(1) however many events were ingested.
//!
//! - **Ledger**: live transactions in arrival order
//! - **Aggregator**: incrementally updated [`Stat`], one mutation lock
//! - **StatsEngine**: ingestion/query boundary plus the eviction pass
//! - **EvictionScheduler**: tokio task that ticks the engine periodically

mod aggregator;
mod clock;
mod config;
pub mod dst;
mod engine;
mod error;
mod ledger;
mod scheduler;
mod types;

pub use aggregator::Aggregator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EvictionPolicy, WindowConfig, DEFAULT_TICK_INTERVAL, DEFAULT_WINDOW_MS};
pub use engine::{EvictionReport, StatsEngine};
pub use error::TransactionError;
pub use ledger::Ledger;
pub use scheduler::{EvictionScheduler, SchedulerHandle};
pub use types::{Stat, Transaction};
