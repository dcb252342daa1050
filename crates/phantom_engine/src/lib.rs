//! Phantom engine: browser adapter, job runner, batch pacing and progress
//! monitoring.
mod chrome;
mod engine;
mod error;
mod filename;
mod monitor;
mod persist;
mod plan;
mod runner;
mod scheduler;
mod settings;

pub use chrome::{ChromeConfig, ChromeEngine};
pub use engine::{ChannelConsoleSink, ConsoleSink, Engine, EnginePage, PageLayout};
pub use error::EngineError;
pub use filename::{batch_output_path, resolve_target};
pub use monitor::{CooperativeMonitor, MonitorOutcome};
pub use persist::{ensure_output_dir, write_atomic, write_atomic_blocking, PersistError};
pub use plan::{plan_jobs, verify_scripts, PlanRequest};
pub use runner::JobRunner;
pub use scheduler::BatchScheduler;
pub use settings::{JobSpec, RenderSettings, DEFAULT_TICK, DEFAULT_WATCHDOG};
