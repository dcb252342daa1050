//! Seams between the job runner and whatever actually renders pages.
use std::path::Path;
use std::sync::Arc;

use phantom_core::{JobEvent, JobId};
use tokio::sync::mpsc;

use crate::EngineError;

/// Receives console messages from a page as they are produced.
pub trait ConsoleSink: Send + Sync {
    fn emit(&self, text: String);
}

/// Forwards console text into a job's event queue.
pub struct ChannelConsoleSink {
    tx: mpsc::UnboundedSender<JobEvent>,
}

impl ChannelConsoleSink {
    pub fn new(tx: mpsc::UnboundedSender<JobEvent>) -> Self {
        Self { tx }
    }
}

impl ConsoleSink for ChannelConsoleSink {
    fn emit(&self, text: String) {
        let _ = self.tx.send(JobEvent::Console(text));
    }
}

/// Paper geometry for print output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub margin_mm: f64,
    pub print_background: bool,
}

impl PageLayout {
    /// ISO A4 portrait with 10 mm margins on every side.
    pub const A4: PageLayout = PageLayout {
        paper_width_in: 8.27,
        paper_height_in: 11.69,
        margin_mm: 10.0,
        print_background: true,
    };

    pub fn margin_in(&self) -> f64 {
        self.margin_mm / 25.4
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::A4
    }
}

/// A rendering engine able to hand out isolated pages.
#[async_trait::async_trait]
pub trait Engine: Send + Sync {
    /// Opens a blank page whose console output is delivered to `console`.
    async fn open_page(
        &self,
        job_id: JobId,
        console: Arc<dyn ConsoleSink>,
    ) -> Result<Arc<dyn EnginePage>, EngineError>;
}

/// One page owned by one job.
///
/// `run_script` only reports injection failures; script progress is
/// observed through the console.
#[async_trait::async_trait]
pub trait EnginePage: Send + Sync {
    async fn load(&self, url: &str) -> Result<(), EngineError>;
    async fn run_script(&self, source: &str) -> Result<(), EngineError>;
    async fn serialize(&self) -> Result<String, EngineError>;
    async fn print(&self, target: &Path, layout: &PageLayout) -> Result<(), EngineError>;
    async fn close(&self);
}
