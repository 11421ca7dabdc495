//! Clock Abstraction
//!
//! Every notion of "now" in the window goes through [`Clock`], so the same
//! engine runs against wall-clock time in production and against a manually
//! driven clock in tests (no 61 second sleeps to see an eviction).

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time in epoch milliseconds
pub trait Clock: Send + Sync + Clone + 'static {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
///
/// Reads `SystemTime` on every call: transaction timestamps arrive as epoch
/// millis from clients, so the comparison must be against the same epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            // Clock set before 1970; report negative millis rather than panic
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }
}

/// Manually driven clock.
///
/// Time only moves via `advance*()` or `set()`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        ManualClock {
            now_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.advance_ms(duration.as_millis() as i64);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
