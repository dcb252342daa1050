use std::path::PathBuf;

use crate::JobRecord;

/// Work the runner must perform on behalf of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEffect {
    Load { url: String },
    RunScript { source: String },
    Serialize,
    /// Persist the job's captured markup to `path`.
    WriteHtml { path: PathBuf },
    Print { path: PathBuf },
    /// Emitted exactly once, when the job becomes terminal.
    Complete(JobRecord),
}
