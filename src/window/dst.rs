//! Deterministic Simulation Testing for the sliding window
//!
//! Shadow-state harness: a seeded RNG drives adds, clock jumps and eviction
//! ticks against a [`StatsEngine`] on a [`ManualClock`], while a brute-force
//! model tracks what the live set should be. Invariants are checked after
//! every operation so a failure pins down the seed and step.
//!
//! ```text
//! for seed in 0..1000 {
//!     let mut harness = WindowDSTHarness::new(WindowDSTConfig::new(seed));
//!     harness.run(500);
//!     assert!(harness.result().is_success());
//! }
//! ```

use super::clock::{Clock, ManualClock};
use super::config::{EvictionPolicy, WindowConfig};
use super::engine::StatsEngine;
use super::error::TransactionError;
use super::types::{Stat, Transaction};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const START_MS: i64 = 1_700_000_000_000;

#[derive(Debug, Clone)]
pub struct WindowDSTConfig {
    pub seed: u64,
    pub window: WindowConfig,
    /// Probability of an add (vs a clock jump or tick)
    pub add_probability: f64,
    /// Probability of a tick among non-add operations
    pub tick_probability: f64,
    /// Largest single clock jump in milliseconds
    pub max_advance_ms: i64,
    /// Amounts are drawn from `0..amount_range` in whole units so ties are common
    pub amount_range: u32,
}

impl Default for WindowDSTConfig {
    fn default() -> Self {
        WindowDSTConfig {
            seed: 0,
            window: WindowConfig::default(),
            add_probability: 0.6,
            tick_probability: 0.5,
            max_advance_ms: 5_000,
            amount_range: 20,
        }
    }
}

impl WindowDSTConfig {
    pub fn new(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            ..Default::default()
        }
    }

    /// Mostly adds, small clock steps: a dense, slowly draining window
    pub fn busy(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            add_probability: 0.85,
            max_advance_ms: 1_000,
            ..Default::default()
        }
    }

    /// Large clock jumps: the window empties and refills often
    pub fn bursty(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            add_probability: 0.4,
            max_advance_ms: 90_000,
            ..Default::default()
        }
    }

    /// Gated eviction. Only policy-independent invariants are checked.
    pub fn gated(seed: u64) -> Self {
        WindowDSTConfig {
            seed,
            window: WindowConfig::default().with_policy(EvictionPolicy::Gated),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub enum WindowOperation {
    Add { amount: f64, timestamp: i64 },
    Advance { ms: i64 },
    Tick,
}

#[derive(Debug, Clone)]
pub struct WindowDSTResult {
    pub seed: u64,
    pub total_operations: u64,
    pub accepted: u64,
    pub rejected_stale: u64,
    pub ticks: u64,
    pub evicted: u64,
    pub invariant_violations: Vec<String>,
}

impl WindowDSTResult {
    pub fn new(seed: u64) -> Self {
        WindowDSTResult {
            seed,
            total_operations: 0,
            accepted: 0,
            rejected_stale: 0,
            ticks: 0,
            evicted: 0,
            invariant_violations: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Seed {}: {} ops ({} accepted, {} stale), {} ticks, {} evicted, {} violations",
            self.seed,
            self.total_operations,
            self.accepted,
            self.rejected_stale,
            self.ticks,
            self.evicted,
            self.invariant_violations.len()
        )
    }
}

pub struct WindowDSTHarness {
    config: WindowDSTConfig,
    rng: ChaCha8Rng,
    clock: ManualClock,
    engine: StatsEngine<ManualClock>,
    /// Shadow live set under the strict policy
    model: Vec<Transaction>,
    result: WindowDSTResult,
}

impl WindowDSTHarness {
    pub fn new(config: WindowDSTConfig) -> Self {
        let clock = ManualClock::new(START_MS);
        let engine = StatsEngine::with_clock(config.window.clone(), clock.clone());
        WindowDSTHarness {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            result: WindowDSTResult::new(config.seed),
            config,
            clock,
            engine,
            model: Vec::new(),
        }
    }

    pub fn run(&mut self, operations: usize) {
        for step in 0..operations {
            let op = self.next_operation();
            self.execute(op.clone());
            self.check_invariants(step, &op);
        }
    }

    pub fn next_operation(&mut self) -> WindowOperation {
        if self.rng.gen_bool(self.config.add_probability) {
            let now = self.clock.now_ms();
            // Reach a little past the window so some adds are stale
            let age = self.rng.gen_range(0..=self.config.window.window_ms + 2_000);
            let amount = self.rng.gen_range(0..self.config.amount_range) as f64;
            WindowOperation::Add {
                amount,
                timestamp: now - age,
            }
        } else if self.rng.gen_bool(self.config.tick_probability) {
            WindowOperation::Tick
        } else {
            WindowOperation::Advance {
                ms: self.rng.gen_range(1..=self.config.max_advance_ms),
            }
        }
    }

    fn execute(&mut self, op: WindowOperation) {
        self.result.total_operations += 1;
        let window_ms = self.config.window.window_ms;

        match op {
            WindowOperation::Add { amount, timestamp } => {
                let now = self.clock.now_ms();
                let expect_stale = now.saturating_sub(timestamp) > window_ms;
                match self.engine.add_transaction(amount, timestamp) {
                    Ok(()) => {
                        self.result.accepted += 1;
                        if expect_stale {
                            self.violation(format!("accepted stale timestamp {}", timestamp));
                        }
                        self.model.push(Transaction::new(amount, timestamp));
                    }
                    Err(TransactionError::Stale { .. }) => {
                        self.result.rejected_stale += 1;
                        if !expect_stale {
                            self.violation(format!("rejected live timestamp {}", timestamp));
                        }
                    }
                    Err(e) => self.violation(format!("unexpected error: {}", e)),
                }
            }
            WindowOperation::Advance { ms } => self.clock.advance_ms(ms),
            WindowOperation::Tick => {
                self.result.ticks += 1;
                let report = self.engine.tick();
                self.result.evicted += report.evicted as u64;
                if self.config.window.eviction_policy == EvictionPolicy::Strict {
                    let cutoff = self.clock.now_ms().saturating_sub(window_ms);
                    self.model.retain(|t| !t.is_expired(cutoff));
                }
            }
        }
    }

    fn check_invariants(&mut self, step: usize, op: &WindowOperation) {
        let stat = self.engine.get_stats();
        let live = self.engine.live_transactions();

        if let Err(e) = stat.check_invariants() {
            self.violation(format!("step {} after {:?}: {}", step, op, e));
        }

        // Stat agrees with whatever the ledger holds, under any policy
        let expected = brute_force(&live);
        if let Some(diff) = compare(&stat, &expected) {
            self.violation(format!("step {} after {:?}: stat vs ledger: {}", step, op, diff));
        }

        if self.config.window.eviction_policy == EvictionPolicy::Strict {
            let mut got: Vec<(i64, u64)> =
                live.iter().map(|t| (t.timestamp, t.amount.to_bits())).collect();
            let mut want: Vec<(i64, u64)> = self
                .model
                .iter()
                .map(|t| (t.timestamp, t.amount.to_bits()))
                .collect();
            got.sort_unstable();
            want.sort_unstable();
            if got != want {
                self.violation(format!(
                    "step {} after {:?}: ledger holds {} entries, model {}",
                    step,
                    op,
                    got.len(),
                    want.len()
                ));
            }
        }
    }

    fn violation(&mut self, msg: String) {
        self.result.invariant_violations.push(msg);
    }

    pub fn engine(&self) -> &StatsEngine<ManualClock> {
        &self.engine
    }

    pub fn result(&self) -> &WindowDSTResult {
        &self.result
    }

    pub fn into_result(self) -> WindowDSTResult {
        self.result
    }
}

fn brute_force(live: &[Transaction]) -> Stat {
    live.iter()
        .fold(Stat::ZERO, |stat, tx| stat.with_added(tx.amount))
}

fn compare(got: &Stat, want: &Stat) -> Option<String> {
    let close = |a: f64, b: f64| (a - b).abs() <= 1e-6 * b.abs().max(1.0);
    if got.count != want.count
        || got.max != want.max
        || got.min != want.min
        || !close(got.sum, want.sum)
        || !close(got.avg, want.avg)
    {
        return Some(format!("got {}, want {}", got, want));
    }
    None
}

/// Run a batch of harnesses over consecutive seeds
pub fn run_dst_batch(
    base_seed: u64,
    count: usize,
    ops_per_run: usize,
    config_fn: impl Fn(u64) -> WindowDSTConfig,
) -> Vec<WindowDSTResult> {
    (0..count)
        .map(|i| {
            let mut harness = WindowDSTHarness::new(config_fn(base_seed + i as u64));
            harness.run(ops_per_run);
            harness.into_result()
        })
        .collect()
}

pub fn summarize_batch(results: &[WindowDSTResult]) -> String {
    let total = results.len();
    let passed = results.iter().filter(|r| r.is_success()).count();
    let failed_seeds: Vec<u64> = results
        .iter()
        .filter(|r| !r.is_success())
        .map(|r| r.seed)
        .collect();

    let total_ops: u64 = results.iter().map(|r| r.total_operations).sum();
    let total_evicted: u64 = results.iter().map(|r| r.evicted).sum();

    let mut summary = format!(
        "Batch: {}/{} passed, {} total ops, {} evicted",
        passed, total, total_ops, total_evicted
    );
    if !failed_seeds.is_empty() {
        summary.push_str(&format!("\nFailed seeds: {:?}", failed_seeds));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dst_harness_default() {
        let mut harness = WindowDSTHarness::new(WindowDSTConfig::new(42));
        harness.run(300);
        let result = harness.result();
        assert!(result.is_success(), "{:?}", result.invariant_violations);
        assert_eq!(result.total_operations, 300);
        assert!(result.accepted > 0);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let run = |seed| {
            let mut harness = WindowDSTHarness::new(WindowDSTConfig::new(seed));
            harness.run(200);
            (harness.engine().get_stats(), harness.into_result().summary())
        };
        assert_eq!(run(7), run(7));
    }
}
