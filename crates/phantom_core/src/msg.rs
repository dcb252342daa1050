/// Inputs to the job state machine: engine callbacks, the watchdog, and the
/// runner's own startup checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// Script source resolved; begin loading the target.
    Start { script: String },
    /// The configured script file could not be read.
    ScriptUnreadable { reason: String },
    /// The engine could not provide a page for this job.
    PageUnavailable { reason: String },
    /// Engine finished loading the page.
    LoadFinished { ok: bool },
    /// A console message from the page.
    Console(String),
    /// Engine serialized the document (or failed to).
    Serialized(Result<String, String>),
    /// The captured markup was persisted (or failed to be).
    HtmlWritten(Result<(), String>),
    /// Engine print pipeline completed.
    Printed { success: bool },
    /// The per-job deadline expired.
    WatchdogFired,
}

impl JobEvent {
    /// Short name for logging; avoids dumping captured markup.
    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::Start { .. } => "start",
            JobEvent::ScriptUnreadable { .. } => "script-unreadable",
            JobEvent::PageUnavailable { .. } => "page-unavailable",
            JobEvent::LoadFinished { .. } => "load-finished",
            JobEvent::Console(_) => "console",
            JobEvent::Serialized(_) => "serialized",
            JobEvent::HtmlWritten(_) => "html-written",
            JobEvent::Printed { .. } => "printed",
            JobEvent::WatchdogFired => "watchdog",
        }
    }
}
