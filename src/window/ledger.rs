//! Ledger - the live transactions in arrival order.
//!
//! Arrival order is not timestamp order: concurrent ingestion can append a
//! younger transaction ahead of an older one, so every expiry decision scans
//! rather than stopping at the first live entry.

use super::types::{Stat, Transaction};
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct Ledger {
    entries: Mutex<VecDeque<Transaction>>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            entries: Mutex::new(VecDeque::with_capacity(1024)),
        }
    }

    /// Append at the tail. Never drops an entry.
    pub fn append(&self, tx: Transaction) {
        self.entries.lock().push_back(tx);
    }

    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the current contents in arrival order
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries.lock().iter().copied().collect()
    }

    /// Remove the first entry equal to `tx`.
    ///
    /// Returns `false` when nothing matched; removing an absent entry is a no-op.
    pub fn remove(&self, tx: &Transaction) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|t| t == tx) {
            Some(idx) => {
                entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Full aggregate over the live entries, `Stat::ZERO` when empty. O(n).
    ///
    /// The sum is accumulated in arrival order; if a partial sum overflows
    /// while the true total is in range, it is redone with every amount
    /// scaled down by a power of two (exact, so nothing is lost).
    pub fn aggregate(&self) -> Stat {
        let entries = self.entries.lock();
        let mut iter = entries.iter();
        let first = match iter.next() {
            Some(first) => first,
            None => return Stat::ZERO,
        };
        let (max, min) = iter.fold((first.amount, first.amount), |(max, min), t| {
            (max.max(t.amount), min.min(t.amount))
        });

        let count = entries.len();
        let mut sum: f64 = entries.iter().map(|t| t.amount).sum();
        if !sum.is_finite() {
            let scale = (count as f64).log2().ceil().exp2();
            sum = entries.iter().map(|t| t.amount / scale).sum::<f64>() * scale;
        }
        Stat {
            sum,
            avg: sum / count as f64,
            max,
            min,
            count: count as i64,
        }
    }

    /// Smallest timestamp among the live entries
    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.entries.lock().iter().map(|t| t.timestamp).min()
    }

    /// Entries whose timestamp is at or before `cutoff`, in arrival order
    pub fn expired(&self, cutoff: i64) -> Vec<Transaction> {
        self.entries
            .lock()
            .iter()
            .filter(|t| t.is_expired(cutoff))
            .copied()
            .collect()
    }
}
