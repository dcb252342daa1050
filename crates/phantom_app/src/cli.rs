use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use phantom_core::sampling::{DEFAULT_MAX_PAUSE_TICKS, DEFAULT_MIN_PAUSE_TICKS, DEFAULT_SAMPLE_SIZE};
use phantom_core::Pacing;
use phantom_engine::{ChromeConfig, PageLayout, PlanRequest, RenderSettings};

#[derive(Parser, Debug)]
#[command(name = "phantom")]
#[command(
    version,
    about = "Render a page in headless Chrome, run a script in it, and save the result as HTML and/or PDF",
    long_about = "Render a page in headless Chrome, run a script in it, and save the result as HTML and/or PDF.\n\nThe script signals completion by logging __PHANTOM_PY_DONE__ to the console. Without --js_input a built-in script reports completion after --script_delay_ms.\n\nIf html_url names a file listing URLs (one per line), up to --sample_size of them are picked at random and rendered with random pauses between starts. Completed targets are printed to stdout."
)]
pub struct Cli {
    /// Page URL, local HTML file, or a file listing URLs one per line
    pub html_url: String,

    #[arg(long = "js_input", value_name = "PATH", help = "Script to run after the page loads")]
    pub js_input: Option<PathBuf>,

    #[arg(long = "html_output", value_name = "PATH", help = "Write the rendered markup here")]
    pub html_output: Option<PathBuf>,

    #[arg(long = "pdf_output", value_name = "PATH", help = "Print the page to an A4 PDF here")]
    pub pdf_output: Option<PathBuf>,

    #[arg(
        long = "log_level",
        default_value_t = 20,
        help = "Numeric log level: 10 debug, 20 info, 30 warning, 40 error"
    )]
    pub log_level: u8,

    #[arg(long = "log_file", value_name = "PATH", help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(long = "show_gui", help = "Show the browser window while rendering")]
    pub show_gui: bool,

    #[arg(
        long,
        default_value_t = 10,
        value_name = "SECS",
        help = "Per-job watchdog; a job still running after this many seconds exits with code 1"
    )]
    pub timeout: u64,

    #[arg(
        long = "script_delay_ms",
        default_value_t = 500,
        value_name = "MS",
        help = "Delay before the built-in script reports completion"
    )]
    pub script_delay_ms: u64,

    #[arg(
        long = "sample_size",
        default_value_t = DEFAULT_SAMPLE_SIZE,
        help = "Maximum number of targets taken from a list file"
    )]
    pub sample_size: usize,

    #[arg(
        long = "min_pause",
        default_value_t = DEFAULT_MIN_PAUSE_TICKS,
        value_name = "TICKS",
        help = "Shortest pause between job starts, in seconds"
    )]
    pub min_pause: u32,

    #[arg(
        long = "max_pause",
        default_value_t = DEFAULT_MAX_PAUSE_TICKS,
        value_name = "TICKS",
        help = "Longest pause between job starts, in seconds"
    )]
    pub max_pause: u32,

    #[arg(long, value_name = "PATH", help = "Chrome executable (auto-detected if omitted)")]
    pub chrome: Option<PathBuf>,
}

impl Cli {
    pub fn plan_request(&self) -> PlanRequest {
        PlanRequest {
            input: self.html_url.clone(),
            script_path: self.js_input.clone(),
            html_output: self.html_output.clone(),
            pdf_output: self.pdf_output.clone(),
            sample_size: self.sample_size,
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            watchdog: Duration::from_secs(self.timeout),
            script_delay: Duration::from_millis(self.script_delay_ms),
            layout: PageLayout::A4,
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            min_pause_ticks: self.min_pause,
            max_pause_ticks: self.max_pause,
        }
    }

    pub fn chrome_config(&self) -> ChromeConfig {
        let mut config = ChromeConfig::default();
        if self.show_gui {
            config = config.visible();
        }
        if let Some(path) = &self.chrome {
            config = config.with_chrome_path(path);
        }
        config
    }
}
