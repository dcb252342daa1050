use std::collections::VecDeque;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use phantom_core::{BatchSnapshot, BatchState, JobRecord, Pacing};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};

use crate::runner::JobRunner;
use crate::settings::{JobSpec, DEFAULT_TICK};

/// Starts the jobs of a batch in order with a random pause between starts.
///
/// Pauses are waited out one tick at a time; completions that arrive
/// meanwhile are folded into the batch state and published at once. Jobs
/// are never awaited before the next start.
pub struct BatchScheduler {
    runner: JobRunner,
    state: BatchState,
    specs: VecDeque<JobSpec>,
    pacing: Pacing,
    tick: Duration,
    rng: StdRng,
    snapshots: watch::Sender<BatchSnapshot>,
}

impl BatchScheduler {
    /// Queues `jobs` in order. The receiver sees the queued batch right away.
    pub fn new(
        runner: JobRunner,
        pacing: Pacing,
        jobs: Vec<JobSpec>,
    ) -> (Self, watch::Receiver<BatchSnapshot>) {
        let state = BatchState::new(jobs.iter().map(|spec| spec.config.target.clone()));
        let (snapshots, rx) = watch::channel(state.snapshot());
        let scheduler = Self {
            runner,
            state,
            specs: jobs.into(),
            pacing,
            tick: DEFAULT_TICK,
            rng: StdRng::from_os_rng(),
            snapshots,
        };
        (scheduler, rx)
    }

    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Runs every job to completion and returns the final batch state.
    pub async fn run(self) -> BatchState {
        let Self {
            runner,
            mut state,
            mut specs,
            pacing,
            tick,
            mut rng,
            snapshots,
        } = self;
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<JobRecord>();
        let total = state.total();

        let mut index = 0;
        while let Some((job_id, target)) = state.start_next() {
            let Some(spec) = specs.pop_front() else {
                engine_warn!("batch has no job description for {}", target);
                break;
            };
            engine_info!("batch starting job {} ({}/{}): {}", job_id, index + 1, total, target);

            let runner = runner.clone();
            let tx = done_tx.clone();
            tokio::spawn(async move {
                let record = runner.run(job_id, spec).await;
                let _ = tx.send(record);
            });
            publish(&snapshots, &state);

            if Pacing::pauses_after(index, total) {
                let ticks = pacing.draw_pause(&mut rng);
                state.note_pause();
                engine_info!("batch pausing {} ticks before the next start", ticks);
                for _ in 0..ticks {
                    tokio::time::sleep(tick).await;
                    while let Ok(record) = done_rx.try_recv() {
                        accept(&snapshots, &mut state, record);
                    }
                }
            }
            index += 1;
        }

        drop(done_tx);
        while !state.is_done() {
            match done_rx.recv().await {
                Some(record) => accept(&snapshots, &mut state, record),
                None => {
                    engine_warn!(
                        "batch lost {} job(s) before completion",
                        state.total() - state.completed().len()
                    );
                    break;
                }
            }
        }
        engine_info!(
            "batch finished: {}/{} completed, exit code {}",
            state.completed().len(),
            state.total(),
            state.exit_code()
        );
        state
    }
}

fn accept(snapshots: &watch::Sender<BatchSnapshot>, state: &mut BatchState, record: JobRecord) {
    engine_debug!("batch received record for job {}", record.job_id);
    if state.record(record) {
        publish(snapshots, state);
    }
}

fn publish(snapshots: &watch::Sender<BatchSnapshot>, state: &BatchState) {
    snapshots.send_replace(state.snapshot());
}
