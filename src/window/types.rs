//! Value types for the sliding window: transactions and the aggregate snapshot.

use serde::{Deserialize, Serialize};

/// A single accepted event. Immutable once it enters the ledger.
///
/// Equality is by `(amount, timestamp)`, so two identical submissions are
/// indistinguishable and removal takes whichever instance comes first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl Transaction {
    pub fn new(amount: f64, timestamp: i64) -> Self {
        Transaction { amount, timestamp }
    }

    /// True once `timestamp` falls at or before `cutoff`
    #[inline]
    pub fn is_expired(&self, cutoff: i64) -> bool {
        self.timestamp <= cutoff
    }
}

/// Aggregate over the live transactions.
///
/// Every update builds a new value; the aggregator publishes it whole so a
/// reader never sees a `sum` from one state and a `count` from another.
///
/// Invariants:
/// - `count == 0` implies every other field is `0.0`
/// - `count > 0` implies `avg == sum / count`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub sum: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub count: i64,
}

impl Default for Stat {
    fn default() -> Self {
        Stat::ZERO
    }
}

impl Stat {
    pub const ZERO: Stat = Stat {
        sum: 0.0,
        avg: 0.0,
        max: 0.0,
        min: 0.0,
        count: 0,
    };

    /// Aggregate of exactly one transaction
    pub fn single(amount: f64) -> Self {
        Stat {
            sum: amount,
            avg: amount,
            max: amount,
            min: amount,
            count: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Fold one more amount into the aggregate.
    pub fn with_added(&self, amount: f64) -> Stat {
        if self.is_empty() {
            return Stat::single(amount);
        }
        let count = self.count + 1;
        let sum = self.sum + amount;
        Stat {
            sum,
            avg: sum / count as f64,
            max: self.max.max(amount),
            min: self.min.min(amount),
            count,
        }
    }

    /// Take one amount back out of the aggregate.
    ///
    /// `rescan` must return the full aggregate over the transactions still
    /// live. It is only invoked when `amount` was the current max or min, or
    /// when the running sum is no longer finite; neither can be repaired from
    /// the incremental state alone.
    pub fn with_removed<F>(&self, amount: f64, rescan: F) -> Stat
    where
        F: FnOnce() -> Stat,
    {
        if self.count <= 1 {
            return Stat::ZERO;
        }
        let sum = self.sum - amount;
        if amount == self.max || amount == self.min || !sum.is_finite() {
            return rescan();
        }
        let count = self.count - 1;
        Stat {
            sum,
            avg: sum / count as f64,
            max: self.max,
            min: self.min,
            count,
        }
    }

    /// Check the structural invariants, returning a description of the first
    /// one that fails.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.count < 0 {
            return Err(format!("negative count {}", self.count));
        }
        if self.count == 0 {
            if self.sum != 0.0 || self.avg != 0.0 || self.max != 0.0 || self.min != 0.0 {
                return Err(format!("empty stat carries values: {:?}", self));
            }
            return Ok(());
        }
        let expected_avg = self.sum / self.count as f64;
        if (self.avg - expected_avg).abs() > 1e-9 * expected_avg.abs().max(1.0) {
            return Err(format!(
                "avg {} does not match sum/count {}",
                self.avg, expected_avg
            ));
        }
        if self.min > self.max {
            return Err(format!("min {} exceeds max {}", self.min, self.max));
        }
        Ok(())
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sum={} avg={} max={} min={} count={}",
            self.sum, self.avg, self.max, self.min, self.count
        )
    }
}
