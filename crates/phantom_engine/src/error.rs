use thiserror::Error;

use crate::persist::PersistError;

/// Failures raised by a rendering engine or its pages.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The browser process could not be started.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// The document could not be serialized back to markup.
    #[error("document capture failed: {0}")]
    CaptureFailed(String),

    #[error("print to pdf failed: {0}")]
    PrintFailed(String),

    #[error("browser instance is already closed")]
    AlreadyClosed,

    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    #[error("persist error: {0}")]
    Persist(#[from] PersistError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
