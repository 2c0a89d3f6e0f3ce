//! Simulated build: parallel workers report problems, then the build tree
//! completes (nested builds first, root last).

use std::sync::Arc;

use anyhow::{Context, Result};
use cache_problems::{
    BuildOutcome, BuildProblems, BuildResult, FileReport, ListenerRegistry, Problem,
    ProblemsError,
};
use tracing::{debug, info, warn};

use crate::config::SimConfig;

/// What the simulated build ended with.
#[derive(Debug)]
pub enum SimOutcome {
    Succeeded {
        outcome: BuildOutcome,
        problems: usize,
    },
    Failed(ProblemsError),
}

fn problem_for(index: usize) -> Problem {
    Problem::new(
        format!("task ':module{}:compileJava' field 'classpath'", index % 5),
        format!("cannot serialize object of type 'Connection#{index}'"),
    )
    .with_category("serialization")
    .with_documentation("configuration_cache:requirements")
}

/// Report this worker's share of problems; stop at the first error.
fn run_worker(
    problems: &BuildProblems,
    worker: usize,
    workers: usize,
    total: usize,
) -> Result<usize, ProblemsError> {
    let mut reported = 0;
    for index in (worker..total).step_by(workers) {
        problems.report(problem_for(index))?;
        reported += 1;
    }
    debug!(worker, reported, "Worker finished");
    Ok(reported)
}

// The threshold error wins over the rejections it caused in other workers.
fn prefer_fatal(current: Option<ProblemsError>, next: ProblemsError) -> Option<ProblemsError> {
    match current {
        Some(existing) if existing.is_fatal_problem() || !next.is_fatal_problem() => {
            Some(existing)
        }
        _ => Some(next),
    }
}

/// Run one simulated build.
pub async fn run(config: &SimConfig) -> Result<SimOutcome> {
    let registry = ListenerRegistry::new().shared();
    let report = Arc::new(FileReport::new(&config.report_dir));
    let problems = Arc::new(BuildProblems::begin(config.problems, report, registry));
    let workers = config.workers.max(1);

    info!(
        problems = config.problem_count,
        workers,
        report_dir = %config.report_dir.display(),
        "Simulated build starting"
    );

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let problems = Arc::clone(&problems);
            let total = config.problem_count;
            tokio::task::spawn_blocking(move || run_worker(&problems, worker, workers, total))
        })
        .collect();

    let mut aborted: Option<ProblemsError> = None;
    for handle in handles {
        if let Err(e) = handle.await.context("Worker panicked")? {
            aborted = prefer_fatal(aborted, e);
        }
    }

    for path in &config.nested_builds {
        problems
            .build_finished(&BuildResult::nested(path.as_str()))
            .context("Nested build completion failed")?;
    }

    // Completion still runs on the abort path so the report is persisted.
    let completion = problems.build_finished(&BuildResult::root());

    problems.run_if_problems(|| {
        info!(report = %problems.report_file().display(), "Problem report available");
    });

    if let Some(err) = aborted {
        warn!("Build aborted: {}", err);
        if let Err(e) = completion {
            warn!("Report could not be written after abort: {}", e);
        }
        return Ok(SimOutcome::Failed(err));
    }

    match completion {
        Ok(()) => Ok(SimOutcome::Succeeded {
            outcome: problems.outcome().unwrap_or(BuildOutcome::SilentSuccess),
            problems: problems.problem_count(),
        }),
        Err(e) if e.is_fatal_problem() => Ok(SimOutcome::Failed(e)),
        Err(e) => Err(e).context("Failed to finish build"),
    }
}
