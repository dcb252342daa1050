use std::path::Path;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use phantom_core::{
    default_script, update, Job, JobEffect, JobEvent, JobExit, JobId, JobRecord,
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::engine::{ChannelConsoleSink, Engine, EnginePage};
use crate::persist::write_atomic_blocking;
use crate::settings::{JobSpec, RenderSettings};

/// Drives one job from creation to a terminal record.
///
/// Engine calls run as spawned tasks that report back through the job's
/// event queue; the loop applies events in arrival order until the job is
/// terminal or the watchdog fires, then aborts whatever is still pending.
#[derive(Clone)]
pub struct JobRunner {
    engine: Arc<dyn Engine>,
    settings: RenderSettings,
}

impl JobRunner {
    pub fn new(engine: Arc<dyn Engine>, settings: RenderSettings) -> Self {
        Self { engine, settings }
    }

    pub async fn run(&self, job_id: JobId, spec: JobSpec) -> JobRecord {
        let watchdog = tokio::time::sleep(self.settings.watchdog);
        tokio::pin!(watchdog);

        let job = Job::new(job_id, spec.config);
        engine_info!("job {} created for {}", job_id, job.target());

        let script = match self.resolve_script(spec.script_path.as_deref()).await {
            Ok(script) => script,
            Err(reason) => {
                return finish_early(job, JobEvent::ScriptUnreadable { reason });
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = Arc::new(ChannelConsoleSink::new(tx.clone()));
        let page = match self.engine.open_page(job_id, sink).await {
            Ok(page) => page,
            Err(err) => {
                return finish_early(
                    job,
                    JobEvent::PageUnavailable {
                        reason: err.to_string(),
                    },
                );
            }
        };

        let mut tasks = JoinSet::new();
        let (mut job, effects) = update(job, JobEvent::Start { script });
        let mut completed = self.execute(&job, effects, &page, &tx, &mut tasks);

        let record = loop {
            if let Some(record) = completed.take() {
                break record;
            }
            let event = tokio::select! {
                _ = &mut watchdog => JobEvent::WatchdogFired,
                Some(event) = rx.recv() => event,
            };
            engine_debug!("job {} received {}", job_id, event.name());
            let (next, effects) = update(job, event);
            job = next;
            completed = self.execute(&job, effects, &page, &tx, &mut tasks);
        };

        tasks.abort_all();
        page.close().await;

        engine_info!(
            "job {} finished: {} ({})",
            record.job_id,
            record.exit,
            record.target
        );
        record
    }

    async fn resolve_script(&self, path: Option<&Path>) -> Result<String, String> {
        match path {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| format!("{}: {e}", path.display())),
            None => Ok(default_script(self.settings.script_delay)),
        }
    }

    /// Starts the engine work named by `effects`. Returns the completion
    /// record if one of them is terminal.
    fn execute(
        &self,
        job: &Job,
        effects: Vec<JobEffect>,
        page: &Arc<dyn EnginePage>,
        tx: &mpsc::UnboundedSender<JobEvent>,
        tasks: &mut JoinSet<()>,
    ) -> Option<JobRecord> {
        let job_id = job.id();
        let mut completed = None;
        for effect in effects {
            match effect {
                JobEffect::Load { url } => {
                    let page = page.clone();
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        let ok = match page.load(&url).await {
                            Ok(()) => true,
                            Err(err) => {
                                engine_warn!("job {} load error: {}", job_id, err);
                                false
                            }
                        };
                        let _ = tx.send(JobEvent::LoadFinished { ok });
                    });
                }
                JobEffect::RunScript { source } => {
                    let page = page.clone();
                    tasks.spawn(async move {
                        if let Err(err) = page.run_script(&source).await {
                            engine_warn!("job {} script error: {}", job_id, err);
                        }
                    });
                }
                JobEffect::Serialize => {
                    let page = page.clone();
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        let result = page.serialize().await.map_err(|err| err.to_string());
                        let _ = tx.send(JobEvent::Serialized(result));
                    });
                }
                JobEffect::WriteHtml { path } => {
                    let tx = tx.clone();
                    let Some(html) = job.captured_html().map(str::to_owned) else {
                        let missing = Err("no captured document".to_string());
                        let _ = tx.send(JobEvent::HtmlWritten(missing));
                        continue;
                    };
                    tasks.spawn(async move {
                        let result = write_atomic_blocking(path, html.into_bytes())
                            .await
                            .map(|_| ())
                            .map_err(|err| err.to_string());
                        let _ = tx.send(JobEvent::HtmlWritten(result));
                    });
                }
                JobEffect::Print { path } => {
                    let page = page.clone();
                    let tx = tx.clone();
                    let layout = self.settings.layout;
                    tasks.spawn(async move {
                        let success = match page.print(&path, &layout).await {
                            Ok(()) => true,
                            Err(err) => {
                                engine_warn!("job {} print error: {}", job_id, err);
                                false
                            }
                        };
                        let _ = tx.send(JobEvent::Printed { success });
                    });
                }
                JobEffect::Complete(record) => completed = Some(record),
            }
        }
        completed
    }
}

/// Terminates a job that never reached the engine.
fn finish_early(job: Job, event: JobEvent) -> JobRecord {
    let (job, effects) = update(job, event);
    effects
        .into_iter()
        .find_map(|effect| match effect {
            JobEffect::Complete(record) => Some(record),
            _ => None,
        })
        .or_else(|| job.record())
        .unwrap_or_else(|| {
            engine_warn!("job {} ended without a completion record", job.id());
            JobRecord {
                job_id: job.id(),
                target: job.target().to_string(),
                exit: JobExit::EngineUnavailable,
            }
        })
}
