use super::clock::Clock;
use super::engine::StatsEngine;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Periodic eviction actor. One per engine for the life of the process.
pub struct EvictionScheduler<C: Clock> {
    engine: StatsEngine<C>,
    period: Duration,
}

impl<C: Clock> EvictionScheduler<C> {
    pub fn new(engine: StatsEngine<C>) -> Self {
        let period = engine.config().tick_interval;
        EvictionScheduler { engine, period }
    }

    /// Tick until `shutdown` fires or its sender is dropped.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut tick = interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = self.period.as_millis() as u64, "eviction scheduler started");

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let report = self.engine.tick();
                    debug!(
                        scanned = report.scanned,
                        evicted = report.evicted,
                        remaining = report.remaining,
                        "eviction tick"
                    );
                }
                _ = &mut shutdown => break,
            }
        }

        info!("eviction scheduler stopped");
    }

    /// Spawn onto the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        SchedulerHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

pub struct SchedulerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
