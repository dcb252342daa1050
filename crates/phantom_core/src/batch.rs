use std::collections::VecDeque;

use engine_logging::{engine_debug, engine_warn};

use crate::{JobId, JobRecord};

/// Progress of one batch invocation.
///
/// Invariant: `completed <= started <= total`. The batch is done exactly when
/// every original target has a completion record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchState {
    total: usize,
    next_id: JobId,
    queued: VecDeque<String>,
    started: Vec<(JobId, String)>,
    completed: Vec<JobRecord>,
    pauses: usize,
}

/// Owned copy of the batch progress handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSnapshot {
    pub total: usize,
    pub queued: usize,
    pub started: usize,
    pub completed: Vec<JobRecord>,
    pub pauses: usize,
}

impl BatchSnapshot {
    pub fn is_done(&self) -> bool {
        self.completed.len() == self.total
    }

    /// Targets in completion order.
    pub fn completed_targets(&self) -> Vec<&str> {
        self.completed.iter().map(|r| r.target.as_str()).collect()
    }

    /// First non-zero exit code in completion order, else 0.
    pub fn exit_code(&self) -> u8 {
        aggregate_exit(&self.completed)
    }
}

impl BatchState {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queued: VecDeque<String> = targets.into_iter().map(Into::into).collect();
        Self {
            total: queued.len(),
            next_id: 1,
            queued,
            started: Vec::new(),
            completed: Vec::new(),
            pauses: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Started job ids in start order.
    pub fn started(&self) -> Vec<JobId> {
        self.started.iter().map(|(id, _)| *id).collect()
    }

    pub fn completed(&self) -> &[JobRecord] {
        &self.completed
    }

    pub fn pauses(&self) -> usize {
        self.pauses
    }

    pub fn has_queued(&self) -> bool {
        !self.queued.is_empty()
    }

    /// Dequeues the next target and marks it started under a fresh id.
    pub fn start_next(&mut self) -> Option<(JobId, String)> {
        let target = self.queued.pop_front()?;
        let job_id = self.next_id;
        self.next_id += 1;
        self.started.push((job_id, target.clone()));
        engine_debug!("batch started job {} for {}", job_id, target);
        Some((job_id, target))
    }

    pub fn note_pause(&mut self) {
        self.pauses += 1;
    }

    /// Appends a completion record. Returns `false` (and records nothing) for
    /// a job that never started or already completed.
    pub fn record(&mut self, record: JobRecord) -> bool {
        if !self.started.iter().any(|(id, _)| *id == record.job_id) {
            engine_warn!("batch ignoring record for unknown job {}", record.job_id);
            return false;
        }
        if self.completed.iter().any(|r| r.job_id == record.job_id) {
            engine_warn!("batch ignoring duplicate record for job {}", record.job_id);
            return false;
        }
        self.completed.push(record);
        true
    }

    pub fn is_done(&self) -> bool {
        self.completed.len() == self.total
    }

    pub fn exit_code(&self) -> u8 {
        aggregate_exit(&self.completed)
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            total: self.total,
            queued: self.queued.len(),
            started: self.started.len(),
            completed: self.completed.clone(),
            pauses: self.pauses,
        }
    }
}

fn aggregate_exit(records: &[JobRecord]) -> u8 {
    records
        .iter()
        .map(|r| r.exit.code())
        .find(|code| *code != 0)
        .unwrap_or(0)
}
