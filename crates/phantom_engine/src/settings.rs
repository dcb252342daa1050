use std::path::PathBuf;
use std::time::Duration;

use phantom_core::sentinel::DEFAULT_SCRIPT_DELAY;
use phantom_core::JobConfig;

use crate::engine::PageLayout;

pub const DEFAULT_WATCHDOG: Duration = Duration::from_secs(10);
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Knobs shared by every job of an invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Per-job deadline, measured from job start.
    pub watchdog: Duration,
    /// Delay before the built-in script reports completion.
    pub script_delay: Duration,
    pub layout: PageLayout,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            watchdog: DEFAULT_WATCHDOG,
            script_delay: DEFAULT_SCRIPT_DELAY,
            layout: PageLayout::A4,
        }
    }
}

/// Everything needed to start one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub config: JobConfig,
    /// User script file; `None` runs the built-in completion script.
    pub script_path: Option<PathBuf>,
}

impl JobSpec {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            script_path: None,
        }
    }

    pub fn with_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_path = Some(path.into());
        self
    }
}
