use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use phantom_core::BatchSnapshot;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::settings::DEFAULT_TICK;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Every target has a completion record.
    Finished(BatchSnapshot),
    /// Stopped before the batch was done.
    Cancelled(BatchSnapshot),
}

impl MonitorOutcome {
    pub fn snapshot(&self) -> &BatchSnapshot {
        match self {
            MonitorOutcome::Finished(snapshot) | MonitorOutcome::Cancelled(snapshot) => snapshot,
        }
    }

    /// Completed targets, one per line, in completion order.
    pub fn report(&self) -> String {
        self.snapshot().completed_targets().join("\n")
    }
}

/// Polls batch progress once per tick until the batch is done or the token
/// is cancelled.
pub struct CooperativeMonitor {
    snapshots: watch::Receiver<BatchSnapshot>,
    tick: Duration,
    cancel: CancellationToken,
}

impl CooperativeMonitor {
    pub fn new(snapshots: watch::Receiver<BatchSnapshot>, cancel: CancellationToken) -> Self {
        Self {
            snapshots,
            tick: DEFAULT_TICK,
            cancel,
        }
    }

    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub async fn run(self) -> MonitorOutcome {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    engine_info!("monitor cancelled after {} ticks", ticks);
                    return MonitorOutcome::Cancelled(self.snapshots.borrow().clone());
                }
                _ = interval.tick() => {}
            }
            ticks += 1;
            engine_logging::set_tick(ticks);

            let snapshot = self.snapshots.borrow().clone();
            if snapshot.is_done() {
                engine_info!(
                    "monitor saw {} of {} targets complete",
                    snapshot.completed.len(),
                    snapshot.total
                );
                return MonitorOutcome::Finished(snapshot);
            }
            if self.snapshots.has_changed().is_err() {
                engine_warn!("batch stopped publishing before it was done");
                return MonitorOutcome::Cancelled(snapshot);
            }
            engine_debug!(
                "tick {}: {}/{} complete, {} started",
                ticks,
                snapshot.completed.len(),
                snapshot.total,
                snapshot.started
            );
        }
    }
}
