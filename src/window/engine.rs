//! StatsEngine - the explicit service handle for the sliding window.
//!
//! Constructed once at startup and cloned into every consumer (connection
//! handlers, the eviction scheduler). Clones share the same aggregator.

use super::aggregator::Aggregator;
use super::clock::{Clock, SystemClock};
use super::config::{EvictionPolicy, WindowConfig};
use super::error::TransactionError;
use super::types::{Stat, Transaction};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one eviction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvictionReport {
    /// Transactions looked at; zero when the pass was skipped
    pub scanned: usize,
    pub evicted: usize,
    pub remaining: usize,
}

struct EngineInner<C: Clock> {
    aggregator: Aggregator,
    /// Advisory timestamp of the oldest live transaction
    window_start: Mutex<Option<i64>>,
    config: WindowConfig,
    clock: C,
}

#[derive(Clone)]
pub struct StatsEngine<C: Clock = SystemClock> {
    inner: Arc<EngineInner<C>>,
}

impl StatsEngine<SystemClock> {
    pub fn new(config: WindowConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> StatsEngine<C> {
    pub fn with_clock(config: WindowConfig, clock: C) -> Self {
        StatsEngine {
            inner: Arc::new(EngineInner {
                aggregator: Aggregator::new(),
                window_start: Mutex::new(None),
                config,
                clock,
            }),
        }
    }

    /// Accept a transaction into the window.
    ///
    /// Fails with [`TransactionError::Stale`] when the timestamp is older than
    /// the window. On success the aggregate already reflects it when this returns.
    pub fn add_transaction(&self, amount: f64, timestamp: i64) -> Result<(), TransactionError> {
        if !amount.is_finite() {
            warn!(amount, "rejecting non-finite amount");
            return Err(TransactionError::InvalidAmount(amount.to_string()));
        }

        let now = self.inner.clock.now_ms();
        self.check_timestamp(timestamp, now)?;

        let tx = Transaction::new(amount, timestamp);
        if self.inner.aggregator.add(tx) {
            *self.inner.window_start.lock() = Some(timestamp);
        }
        Ok(())
    }

    /// Accept a transaction stamped with the current time.
    pub fn add_transaction_now(&self, amount: f64) -> Result<(), TransactionError> {
        let now = self.inner.clock.now_ms();
        self.add_transaction(amount, now)
    }

    /// Accept a transaction from untyped input (e.g. form fields).
    ///
    /// A missing timestamp means "now".
    pub fn add_raw(&self, amount: &str, timestamp: Option<&str>) -> Result<(), TransactionError> {
        let parsed_amount: f64 = amount.trim().parse().map_err(|_| {
            warn!(raw = amount, "rejecting unparsable amount");
            TransactionError::InvalidAmount(amount.to_string())
        })?;

        match timestamp {
            Some(raw) => {
                let parsed_ts: i64 = raw.trim().parse().map_err(|_| {
                    warn!(raw, "rejecting unparsable timestamp");
                    TransactionError::InvalidTimestamp(raw.to_string())
                })?;
                self.add_transaction(parsed_amount, parsed_ts)
            }
            None => self.add_transaction_now(parsed_amount),
        }
    }

    /// Current aggregate. O(1).
    #[inline]
    pub fn get_stats(&self) -> Stat {
        self.inner.aggregator.snapshot()
    }

    /// Run one eviction pass against the current time.
    pub fn tick(&self) -> EvictionReport {
        let inner = &*self.inner;
        let ledger = inner.aggregator.ledger();

        if ledger.is_empty() {
            inner.aggregator.reset_if_empty();
            *inner.window_start.lock() = None;
            return EvictionReport::default();
        }

        let now = inner.clock.now_ms();
        let window_ms = inner.config.window_ms;
        let cutoff = now.saturating_sub(window_ms);

        let due = match inner.config.eviction_policy {
            EvictionPolicy::Strict => true,
            EvictionPolicy::Gated => {
                let marker = *inner.window_start.lock();
                !matches!(marker, Some(start) if now.saturating_sub(start) < window_ms)
            }
        };

        let mut report = EvictionReport::default();
        if due {
            let snapshot = ledger.snapshot();
            report.scanned = snapshot.len();
            for tx in snapshot.iter().filter(|tx| tx.is_expired(cutoff)) {
                if inner.aggregator.remove(tx) {
                    report.evicted += 1;
                }
            }
        }

        report.remaining = ledger.size();
        *inner.window_start.lock() = ledger.oldest_timestamp();

        if report.evicted > 0 {
            debug!(
                evicted = report.evicted,
                remaining = report.remaining,
                cutoff,
                "evicted expired transactions"
            );
        }
        report
    }

    /// Timestamp of the oldest live transaction as of the last add or tick
    pub fn window_start(&self) -> Option<i64> {
        *self.inner.window_start.lock()
    }

    pub fn live_count(&self) -> usize {
        self.inner.aggregator.ledger().size()
    }

    /// Live transactions in arrival order
    pub fn live_transactions(&self) -> Vec<Transaction> {
        self.inner.aggregator.ledger().snapshot()
    }

    pub fn config(&self) -> &WindowConfig {
        &self.inner.config
    }

    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    fn check_timestamp(&self, timestamp: i64, now: i64) -> Result<(), TransactionError> {
        let window_ms = self.inner.config.window_ms;
        if now.saturating_sub(timestamp) > window_ms {
            debug!(timestamp, now, "rejecting stale transaction");
            return Err(TransactionError::Stale {
                timestamp,
                now,
                window_ms,
            });
        }

        if let Some(max_skew_ms) = self.inner.config.max_future_skew_ms {
            if timestamp.saturating_sub(now) > max_skew_ms {
                debug!(timestamp, now, "rejecting future transaction");
                return Err(TransactionError::Future {
                    timestamp,
                    now,
                    max_skew_ms,
                });
            }
        }
        Ok(())
    }
}
