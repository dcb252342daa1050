//! Phantom core: pure job state machine, completion protocol and batch
//! bookkeeping. Nothing in this crate performs I/O.
mod batch;
mod effect;
mod job;
mod msg;
pub mod sampling;
pub mod sentinel;
mod state;
mod update;

pub use batch::{BatchSnapshot, BatchState};
pub use effect::JobEffect;
pub use job::{Job, JobConfig};
pub use msg::JobEvent;
pub use sampling::{parse_target_list, sample_targets, Pacing};
pub use sentinel::{classify, default_script, Marker};
pub use state::{JobExit, JobId, JobRecord, Stage};
pub use update::update;
