//! Completion markers carried over the page console.
//!
//! The engine has no native "script finished" signal, so injected scripts
//! print these literal strings with `console.log`. The strings must stay
//! bit-exact for compatibility with existing scripts.
use std::fmt;
use std::time::Duration;

pub const DONE_MARKER: &str = "__PHANTOM_PY_DONE__";
pub const SAVED_MARKER: &str = "__PHANTOM_PY_SAVED__";
pub const PRINTED_MARKER: &str = "__PHANTOM_PY_PRINTED__";

/// Delay before the default script reports completion.
pub const DEFAULT_SCRIPT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Marker {
    Done,
    Saved,
    Printed,
}

impl Marker {
    /// Markers in protocol order.
    pub const ALL: [Marker; 3] = [Marker::Done, Marker::Saved, Marker::Printed];

    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Done => DONE_MARKER,
            Marker::Saved => SAVED_MARKER,
            Marker::Printed => PRINTED_MARKER,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the first marker, in protocol order, contained anywhere in `text`.
pub fn classify(text: &str) -> Option<Marker> {
    Marker::ALL
        .into_iter()
        .find(|marker| text.contains(marker.as_str()))
}

/// Script injected when the job has none: reports `DONE` after `delay`.
pub fn default_script(delay: Duration) -> String {
    format!(
        "setTimeout(function() {{ console.log('{DONE_MARKER}') }}, {});",
        delay.as_millis()
    )
}
