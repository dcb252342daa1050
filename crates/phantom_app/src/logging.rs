//! Logger initialization for the phantom binary.
//!
//! Logs go to stderr; stdout carries only the list of completed targets.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Maps a numeric level (10 debug, 20 info, 30 warning, 40 error) to a
/// filter. Values between steps round up to the next step; 0 enables
/// everything.
pub fn level_from_numeric(level: u8) -> LevelFilter {
    match level {
        0 => LevelFilter::Trace,
        1..=10 => LevelFilter::Debug,
        11..=20 => LevelFilter::Info,
        21..=30 => LevelFilter::Warn,
        _ => LevelFilter::Error,
    }
}

/// Applies the `DEBUG` environment override: any positive integer forces
/// at least debug output.
pub fn effective_level(level: u8, debug_env: Option<&str>) -> LevelFilter {
    let requested = level_from_numeric(level);
    let forced = debug_env
        .and_then(|value| value.trim().parse::<i64>().ok())
        .is_some_and(|value| value > 0);
    if forced {
        requested.max(LevelFilter::Debug)
    } else {
        requested
    }
}

/// Installs the global logger. A second call is a no-op.
pub fn initialize(level: LevelFilter, log_file: Option<&Path>) {
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        if let Some(file_logger) = create_file_logger(path, level, config) {
            loggers.push(file_logger);
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(path: &Path, level: LevelFilter, config: Config) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
