mod cli;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info, engine_warn};
use phantom_core::JobExit;
use phantom_engine::{
    plan_jobs, verify_scripts, BatchScheduler, ChromeEngine, CooperativeMonitor, JobRunner,
    JobSpec, MonitorOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let debug_env = std::env::var("DEBUG").ok();
    logging::initialize(
        logging::effective_level(cli.log_level, debug_env.as_deref()),
        cli.log_file.as_deref(),
    );

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::from(JobExit::EngineUnavailable.code())
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut rng = StdRng::from_os_rng();
    let jobs = match prepare(&cli, &mut rng).await {
        Ok(jobs) => jobs,
        Err(code) => return Ok(code),
    };

    let engine = Arc::new(
        ChromeEngine::launch(cli.chrome_config())
            .await
            .context("could not start Chrome")?,
    );
    let runner = JobRunner::new(engine.clone(), cli.render_settings());
    let (scheduler, snapshots) = BatchScheduler::new(runner, cli.pacing(), jobs);
    let scheduler = tokio::spawn(scheduler.with_rng(rng).run());

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                engine_warn!("interrupted, abandoning pending jobs");
                cancel.cancel();
            }
        }
    });

    let outcome = CooperativeMonitor::new(snapshots, cancel).run().await;
    let report = outcome.report();
    if !report.is_empty() {
        println!("{report}");
    }

    let code = match &outcome {
        MonitorOutcome::Finished(snapshot) => {
            if let Err(err) = scheduler.await {
                engine_warn!("scheduler ended abnormally: {}", err);
            }
            snapshot.exit_code()
        }
        // Jobs that never finished are left out of the exit code.
        MonitorOutcome::Cancelled(snapshot) => {
            scheduler.abort();
            snapshot.exit_code()
        }
    };

    if let Err(err) = engine.shutdown().await {
        engine_warn!("chrome did not shut down cleanly: {}", err);
    }
    engine_info!("exiting with code {}", code);
    Ok(code)
}

/// Plans the jobs and checks their inputs. `Err` carries the exit code of a
/// run that ends before the browser is started.
async fn prepare(cli: &Cli, rng: &mut StdRng) -> Result<Vec<JobSpec>, u8> {
    let jobs = plan_jobs(&cli.plan_request(), rng);
    if jobs.is_empty() {
        engine_warn!("nothing to render for {}", cli.html_url);
        return Err(0);
    }
    if let Err(reason) = verify_scripts(&jobs).await {
        engine_error!("cannot read script: {}", reason);
        return Err(JobExit::ScriptUnreadable.code());
    }
    Ok(jobs)
}
