//! Concurrency Tests
//!
//! Many ingestion threads, an evicting ticker and snapshot readers running
//! against one engine. Verifies no lost updates and that readers only ever
//! observe complete stats.

use std::sync::atomic::{AtomicBool, Ordering};
use window_stats::window::{ManualClock, StatsEngine, WindowConfig};

const T0: i64 = 1_700_000_000_000;
const WRITERS: usize = 8;
const PER_WRITER: usize = 2_000;

#[test]
fn test_concurrent_adds_lose_nothing() {
    let clock = ManualClock::new(T0);
    let engine = StatsEngine::with_clock(WindowConfig::default(), clock);
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let engine = engine.clone();
                s.spawn(move || {
                    for i in 0..PER_WRITER {
                        let amount = ((w * PER_WRITER + i) % 100) as f64;
                        engine.add_transaction(amount, T0).unwrap();
                    }
                })
            })
            .collect();

        // Nothing is old enough to expire; ticks must not disturb the count
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                engine.tick();
            }
        });

        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                let stat = engine.get_stats();
                stat.check_invariants().unwrap();
                assert!(stat.max <= 99.0);
                assert!(stat.min >= 0.0);
            }
        });

        for handle in writers {
            handle.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });

    let total = WRITERS * PER_WRITER;
    let stat = engine.get_stats();
    assert_eq!(stat.count as usize, total);
    assert_eq!(engine.live_count(), total);

    // Each writer contributes every residue 0..100 exactly PER_WRITER/100 times
    let expected_sum = (0..100).sum::<usize>() as f64 * (total / 100) as f64;
    assert_eq!(stat.sum, expected_sum);
    assert_eq!(stat.max, 99.0);
    assert_eq!(stat.min, 0.0);
}

#[test]
fn test_concurrent_adds_during_eviction() {
    let clock = ManualClock::new(T0);
    let engine = StatsEngine::with_clock(WindowConfig::default(), clock.clone());

    // Old population with extremes that will expire
    for i in 0..1_000 {
        let amount = if i == 500 { 10_000.0 } else { -(i as f64) };
        engine.add_transaction(amount, T0 - 59_000).unwrap();
    }
    clock.advance_ms(2_000);

    let done = AtomicBool::new(false);
    std::thread::scope(|s| {
        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let engine = engine.clone();
                s.spawn(move || {
                    for i in 0..PER_WRITER {
                        let amount = 100.0 + ((w + i) % 50) as f64;
                        engine.add_transaction(amount, T0 + 2_000).unwrap();
                    }
                })
            })
            .collect();

        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                engine.tick();
                engine.get_stats().check_invariants().unwrap();
            }
        });

        for handle in writers {
            handle.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });

    engine.tick();

    let stat = engine.get_stats();
    assert_eq!(stat.count as usize, WRITERS * PER_WRITER);
    assert_eq!(stat.max, 149.0);
    assert_eq!(stat.min, 100.0);
    stat.check_invariants().unwrap();
}
