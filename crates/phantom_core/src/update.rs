use engine_logging::{engine_debug, engine_error, engine_warn};

use crate::sentinel::{self, Marker};
use crate::{Job, JobEffect, JobEvent, JobExit, Stage};

/// Pure update function: applies an event to a job and returns any effects.
pub fn update(mut job: Job, event: JobEvent) -> (Job, Vec<JobEffect>) {
    if job.is_terminal() {
        engine_debug!("job {} ignoring {} after terminal", job.id(), event.name());
        return (job, Vec::new());
    }

    let stage = job.stage();
    let effects = match (stage, event) {
        (Stage::Created, JobEvent::Start { script }) => {
            job.set_script(script);
            job.set_stage(Stage::Loading);
            vec![JobEffect::Load {
                url: job.target().to_string(),
            }]
        }
        (Stage::Created, JobEvent::ScriptUnreadable { reason }) => {
            engine_error!("job {} cannot read script: {}", job.id(), reason);
            job.terminate(JobExit::ScriptUnreadable)
        }
        (Stage::Created | Stage::Loading, JobEvent::PageUnavailable { reason }) => {
            engine_error!("job {} has no page: {}", job.id(), reason);
            job.terminate(JobExit::EngineUnavailable)
        }
        (Stage::Loading, JobEvent::LoadFinished { ok }) => {
            if !ok {
                engine_warn!("job {} load of {} reported failure", job.id(), job.target());
            }
            job.set_stage(Stage::Evaluating);
            let source = job.take_script();
            // Script outcome arrives over the console, not as a return value.
            job.set_stage(Stage::AwaitingDone);
            vec![JobEffect::RunScript { source }]
        }
        (_, JobEvent::Console(text)) => on_console(&mut job, text),
        (Stage::Saving, JobEvent::Serialized(result)) if job.captured_html().is_none() => {
            match (result, job.config().html_output.clone()) {
                (Ok(html), Some(path)) => {
                    job.store_html(html);
                    vec![JobEffect::WriteHtml { path }]
                }
                (result, _) => {
                    let reason = result
                        .err()
                        .unwrap_or_else(|| "no html output configured".to_string());
                    engine_error!("job {} serialize failed: {}", job.id(), reason);
                    job.terminate(JobExit::CaptureFailed)
                }
            }
        }
        (Stage::Saving, JobEvent::HtmlWritten(result)) if job.captured_html().is_some() => {
            match result {
                Ok(()) => job.advance(Marker::Saved),
                Err(reason) => {
                    engine_error!("job {} could not write html: {}", job.id(), reason);
                    job.terminate(JobExit::CaptureFailed)
                }
            }
        }
        (Stage::Printing, JobEvent::Printed { success }) => {
            if success {
                job.advance(Marker::Printed)
            } else {
                engine_error!("job {} print failed", job.id());
                job.terminate(JobExit::PrintFailed)
            }
        }
        (_, JobEvent::WatchdogFired) => {
            engine_warn!(
                "job {} watchdog fired in stage {:?} for {}",
                job.id(),
                stage,
                job.target()
            );
            job.terminate(JobExit::Timeout)
        }
        (stage, event) => {
            engine_warn!(
                "job {} unexpected {} in stage {:?}",
                job.id(),
                event.name(),
                stage
            );
            Vec::new()
        }
    };

    (job, effects)
}

fn on_console(job: &mut Job, text: String) -> Vec<JobEffect> {
    engine_debug!("job {} console: {}", job.id(), text);
    let marker = sentinel::classify(&text);
    job.note_console(text);

    match (job.stage(), marker) {
        (_, None) => Vec::new(),
        // Scripts may report later markers themselves; honour them as skips.
        (Stage::AwaitingDone, Some(marker)) => job.advance(marker),
        (stage, Some(marker)) => {
            engine_debug!(
                "job {} ignoring console marker {:?} in stage {:?}",
                job.id(),
                marker,
                stage
            );
            Vec::new()
        }
    }
}
