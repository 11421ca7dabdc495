//! Aggregator - owns the ledger and the incrementally maintained `Stat`.
//!
//! ## Locking
//!
//! ```text
//! writer:  working.lock() ──► ledger (append/remove/scan) ──► published.write()
//! reader:  published.read()  (copy, O(1))
//! ```
//!
//! All mutations are serialized through `working`. The ledger's own lock is
//! only ever taken after `working`, never the other way round, and readers
//! never touch either. A writer recomputing extrema over a large ledger
//! therefore does not stall `snapshot()`.

use super::ledger::Ledger;
use super::types::{Stat, Transaction};
use parking_lot::{Mutex, RwLock};

#[derive(Debug, Default)]
pub struct Aggregator {
    ledger: Ledger,
    /// Mutation lock; the value inside is the writers' view of the stat
    working: Mutex<Stat>,
    /// Last complete stat, swapped in whole after each mutation
    published: RwLock<Stat>,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            ledger: Ledger::new(),
            working: Mutex::new(Stat::ZERO),
            published: RwLock::new(Stat::ZERO),
        }
    }

    /// Record a transaction. Returns `true` when the ledger was empty
    /// beforehand, i.e. this transaction starts a new window.
    pub fn add(&self, tx: Transaction) -> bool {
        let mut stat = self.working.lock();
        let was_empty = self.ledger.is_empty();
        self.ledger.append(tx);

        let next = if was_empty {
            Stat::single(tx.amount)
        } else {
            stat.with_added(tx.amount)
        };
        // A running sum that hit infinity cannot be walked back incrementally
        *stat = if next.sum.is_finite() {
            next
        } else {
            self.ledger.aggregate()
        };
        self.publish(*stat);
        was_empty
    }

    /// Drop a transaction from the window.
    ///
    /// Returns `false` if it was no longer in the ledger, in which case the
    /// stat is left untouched.
    pub fn remove(&self, tx: &Transaction) -> bool {
        let mut stat = self.working.lock();
        if !self.ledger.remove(tx) {
            return false;
        }

        *stat = stat.with_removed(tx.amount, || self.ledger.aggregate());
        self.publish(*stat);
        true
    }

    /// Force the zero state if the ledger is empty. Returns whether it was.
    pub fn reset_if_empty(&self) -> bool {
        let mut stat = self.working.lock();
        if !self.ledger.is_empty() {
            return false;
        }
        *stat = Stat::ZERO;
        self.publish(Stat::ZERO);
        true
    }

    /// Current aggregate. O(1), independent of the ledger.
    #[inline]
    pub fn snapshot(&self) -> Stat {
        *self.published.read()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn publish(&self, stat: Stat) {
        *self.published.write() = stat;
    }
}
