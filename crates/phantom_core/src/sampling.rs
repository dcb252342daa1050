//! Target-list parsing plus the randomized sampling and pacing used to stay
//! under upstream rate limits.
use engine_logging::engine_warn;
use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

pub const DEFAULT_SAMPLE_SIZE: usize = 4;
pub const DEFAULT_MIN_PAUSE_TICKS: u32 = 1;
pub const DEFAULT_MAX_PAUSE_TICKS: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min_pause_ticks: u32,
    pub max_pause_ticks: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min_pause_ticks: DEFAULT_MIN_PAUSE_TICKS,
            max_pause_ticks: DEFAULT_MAX_PAUSE_TICKS,
        }
    }
}

impl Pacing {
    /// Draws the pause after a job start, in ticks. Bounds given in the wrong
    /// order are swapped.
    pub fn draw_pause<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let low = self.min_pause_ticks.min(self.max_pause_ticks);
        let high = self.min_pause_ticks.max(self.max_pause_ticks);
        rng.random_range(low..=high)
    }

    /// Whether a pause follows the start at `index` (0-based) of `total` jobs.
    pub fn pauses_after(index: usize, total: usize) -> bool {
        index + 1 < total
    }
}

/// Parses a list file into targets. Each non-blank, non-comment line must be
/// an absolute http, https or file URL, or a bare host (`c.example`,
/// `localhost:8080`) which is read as http. Returns `None` when any line is
/// neither, so the file is treated as a page.
pub fn parse_target_list(text: &str) -> Option<Vec<String>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if lines.is_empty() {
        return None;
    }
    let targets: Vec<String> = lines.iter().filter_map(|line| list_entry(line)).collect();
    if targets.len() == lines.len() {
        return Some(targets);
    }
    if !targets.is_empty() {
        engine_warn!(
            "{} of {} lines look like targets but the rest do not; reading the file as a page",
            targets.len(),
            lines.len()
        );
    }
    None
}

fn list_entry(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Some(line.to_string());
        }
    }
    if line.contains(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\\')) {
        return None;
    }
    let url = Url::parse(&format!("http://{line}")).ok()?;
    let host = url.host_str()?;
    let host_like = host.contains('.') || host == "localhost" || url.port().is_some();
    host_like.then(|| url.to_string())
}

/// Shuffles `targets` and keeps at most `sample_size` of them.
pub fn sample_targets<R: Rng + ?Sized>(
    mut targets: Vec<String>,
    sample_size: usize,
    rng: &mut R,
) -> Vec<String> {
    targets.shuffle(rng);
    targets.truncate(sample_size);
    targets
}
