use std::fmt;

pub type JobId = u64;

/// Pipeline position of a job. Variants are declared in pipeline order so
/// `Ord` reflects progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    #[default]
    Created,
    Loading,
    Evaluating,
    AwaitingDone,
    Saving,
    Printing,
    Terminal,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        self == Stage::Terminal
    }
}

/// Final outcome of a job, convertible to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobExit {
    Success,
    Timeout,
    PrintFailed,
    CaptureFailed,
    EngineUnavailable,
    ScriptUnreadable,
}

impl JobExit {
    pub const fn code(self) -> u8 {
        match self {
            JobExit::Success => 0,
            JobExit::Timeout => 1,
            JobExit::PrintFailed => 2,
            JobExit::CaptureFailed => 3,
            JobExit::EngineUnavailable => 4,
            JobExit::ScriptUnreadable => 10,
        }
    }
}

impl fmt::Display for JobExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobExit::Success => write!(f, "success"),
            JobExit::Timeout => write!(f, "watchdog timeout"),
            JobExit::PrintFailed => write!(f, "print failed"),
            JobExit::CaptureFailed => write!(f, "capture failed"),
            JobExit::EngineUnavailable => write!(f, "engine unavailable"),
            JobExit::ScriptUnreadable => write!(f, "script unreadable"),
        }
    }
}

/// What remains of a job once it is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: JobId,
    pub target: String,
    pub exit: JobExit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered_by_pipeline_position() {
        assert!(Stage::Created < Stage::Loading);
        assert!(Stage::AwaitingDone < Stage::Saving);
        assert!(Stage::Printing < Stage::Terminal);
        assert_eq!(Stage::default(), Stage::Created);
    }

    #[test]
    fn exit_codes_match_process_contract() {
        assert_eq!(JobExit::Success.code(), 0);
        assert_eq!(JobExit::Timeout.code(), 1);
        assert_eq!(JobExit::ScriptUnreadable.code(), 10);
        assert_ne!(JobExit::PrintFailed.code(), 0);
        assert_ne!(JobExit::CaptureFailed.code(), 0);
        assert_eq!(JobExit::EngineUnavailable.code(), 4);
    }
}
