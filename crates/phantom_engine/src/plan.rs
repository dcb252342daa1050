//! Turns command-line input into the list of jobs to run.
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use phantom_core::{parse_target_list, sample_targets, JobConfig};
use rand::Rng;

use crate::filename::{batch_output_path, resolve_target};
use crate::settings::JobSpec;

/// What the user asked to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanRequest {
    /// A URL, a local page, or a list file of URLs.
    pub input: String,
    pub script_path: Option<PathBuf>,
    pub html_output: Option<PathBuf>,
    pub pdf_output: Option<PathBuf>,
    pub sample_size: usize,
}

/// Expands `request` into job specs in start order.
///
/// A list file is shuffled and cut to `sample_size`. With more than one
/// target each job gets its own output paths.
pub fn plan_jobs<R: Rng + ?Sized>(request: &PlanRequest, rng: &mut R) -> Vec<JobSpec> {
    let targets = match read_list(Path::new(request.input.trim())) {
        Some(list) => {
            let listed = list.len();
            let sampled = sample_targets(list, request.sample_size, rng);
            engine_info!(
                "list {} names {} targets, running {}",
                request.input.trim(),
                listed,
                sampled.len()
            );
            sampled
        }
        None => vec![resolve_target(&request.input)],
    };

    let batch = targets.len() > 1;
    targets
        .into_iter()
        .map(|target| {
            let mut config = JobConfig::new(target.clone());
            if let Some(path) = &request.html_output {
                config = config.with_html_output(output_for(path, &target, batch));
            }
            if let Some(path) = &request.pdf_output {
                config = config.with_pdf_output(output_for(path, &target, batch));
            }
            JobSpec {
                config,
                script_path: request.script_path.clone(),
            }
        })
        .collect()
}

/// Reads every distinct script the jobs name. Fails with the first path that
/// cannot be read, before any engine work starts.
pub async fn verify_scripts(jobs: &[JobSpec]) -> Result<(), String> {
    let mut checked: Vec<&Path> = Vec::new();
    for path in jobs.iter().filter_map(|job| job.script_path.as_deref()) {
        if checked.contains(&path) {
            continue;
        }
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("{}: {e}", path.display()))?;
        checked.push(path);
    }
    Ok(())
}

fn read_list(path: &Path) -> Option<Vec<String>> {
    if !path.is_file() {
        return None;
    }
    // Unreadable or non-UTF-8 files are pages, not lists.
    let text = std::fs::read_to_string(path).ok()?;
    let list = parse_target_list(&text);
    if list.is_none() {
        engine_debug!("{} is not a target list", path.display());
    }
    list
}

fn output_for(base: &Path, target: &str, batch: bool) -> PathBuf {
    if batch {
        batch_output_path(base, target)
    } else {
        base.to_path_buf()
    }
}
