use std::path::PathBuf;

use engine_logging::{engine_error, engine_info};

use crate::sentinel::Marker;
use crate::{JobEffect, JobExit, JobId, JobRecord, Stage};

/// Fixed configuration of a job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobConfig {
    pub target: String,
    pub html_output: Option<PathBuf>,
    pub pdf_output: Option<PathBuf>,
}

impl JobConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_html_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.html_output = Some(path.into());
        self
    }

    pub fn with_pdf_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdf_output = Some(path.into());
        self
    }
}

/// One page-processing unit and its pipeline state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    config: JobConfig,
    stage: Stage,
    script: Option<String>,
    html: Option<String>,
    last_console: Option<String>,
    exit: Option<JobExit>,
}

impl Job {
    pub fn new(id: JobId, config: JobConfig) -> Self {
        Self {
            id,
            config,
            stage: Stage::Created,
            script: None,
            html: None,
            last_console: None,
            exit: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.config.target
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn exit(&self) -> Option<JobExit> {
        self.exit
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn captured_html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn last_console(&self) -> Option<&str> {
        self.last_console.as_deref()
    }

    pub fn record(&self) -> Option<JobRecord> {
        self.exit.map(|exit| JobRecord {
            job_id: self.id,
            target: self.config.target.clone(),
            exit,
        })
    }

    pub(crate) fn set_stage(&mut self, next: Stage) {
        if next < self.stage {
            engine_error!(
                "job {} refused backwards transition {:?} -> {:?}",
                self.id,
                self.stage,
                next
            );
            return;
        }
        engine_info!("job {} stage {:?} -> {:?}", self.id, self.stage, next);
        self.stage = next;
    }

    pub(crate) fn set_script(&mut self, script: String) {
        self.script = Some(script);
    }

    pub(crate) fn take_script(&mut self) -> String {
        self.script.take().unwrap_or_default()
    }

    pub(crate) fn store_html(&mut self, html: String) {
        self.html = Some(html);
    }

    pub(crate) fn note_console(&mut self, text: String) {
        self.last_console = Some(text);
    }

    /// Moves the pipeline past `marker`, skipping stages the configuration
    /// did not request.
    pub(crate) fn advance(&mut self, marker: Marker) -> Vec<JobEffect> {
        match marker {
            Marker::Done => {
                if self.config.html_output.is_some() {
                    self.set_stage(Stage::Saving);
                    vec![JobEffect::Serialize]
                } else {
                    self.advance(Marker::Saved)
                }
            }
            Marker::Saved => match self.config.pdf_output.clone() {
                Some(path) => {
                    self.set_stage(Stage::Printing);
                    vec![JobEffect::Print { path }]
                }
                None => self.advance(Marker::Printed),
            },
            Marker::Printed => self.terminate(JobExit::Success),
        }
    }

    /// Fixes the exit and jumps to `Terminal`. Only the first call has effect.
    pub(crate) fn terminate(&mut self, exit: JobExit) -> Vec<JobEffect> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.exit = Some(exit);
        self.set_stage(Stage::Terminal);
        self.record().map(JobEffect::Complete).into_iter().collect()
    }
}
