//! Lifecycle Manager and Problem Sink for one build invocation
//!
//! [`BuildProblems`] registers a [`ProblemCollector`] and an
//! [`OutcomeArbiter`] on creation and removes both when dropped, so no
//! listener outlives its build on any exit path. It is also the entry
//! point producers report through.
//!
//! # Usage
//!
//! ```ignore
//! let registry = ListenerRegistry::new().shared();
//! let problems = BuildProblems::begin(config, Arc::new(FileReport::new(dir)), registry);
//!
//! problems.report(Problem::new("task ':app:jar'", "cannot serialize Thread"))?;
//!
//! problems.build_finished(&BuildResult::root())?;
//! problems.run_if_problems(|| println!("report: {}", problems.report_file().display()));
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::arbiter::{BuildOutcome, OutcomeArbiter};
use crate::collector::{lock_state, new_shared_state, ProblemCollector, SharedProblemState};
use crate::config::ProblemsConfig;
use crate::error::ProblemsResult;
use crate::events::{BuildResult, ListenerId, ProblemListener, SharedListenerRegistry};
use crate::problem::Problem;
use crate::report::ProblemReport;

/// Problem handling scoped to one top-level build invocation
pub struct BuildProblems {
    config: ProblemsConfig,
    report: Arc<dyn ProblemReport>,
    registry: SharedListenerRegistry,
    state: SharedProblemState,
    collector_id: ListenerId,
    arbiter_id: ListenerId,
}

impl BuildProblems {
    /// Start handling problems for a build: fresh log, listeners registered.
    pub fn begin(
        config: ProblemsConfig,
        report: Arc<dyn ProblemReport>,
        registry: SharedListenerRegistry,
    ) -> Self {
        let state = new_shared_state();

        let collector = ProblemCollector::new(config, Arc::clone(&state), report.report_file());
        let arbiter = OutcomeArbiter::new(config, Arc::clone(&state), Arc::clone(&report));

        let collector_id = registry.add_problem_listener(Arc::new(collector));
        let arbiter_id = registry.add_build_listener(Arc::new(arbiter));

        info!(
            max_problems = config.max_problems(),
            fail_on_problems = config.fail_on_problems(),
            "Configuration cache problem handling started"
        );

        Self {
            config,
            report,
            registry,
            state,
            collector_id,
            arbiter_id,
        }
    }

    /// Report a problem to every registered listener.
    ///
    /// Returns the first listener error, including the threshold abort.
    pub fn report(&self, problem: Problem) -> ProblemsResult<()> {
        self.registry.broadcast_problem(&problem)
    }

    /// Broadcast a build completion event.
    pub fn build_finished(&self, result: &BuildResult) -> ProblemsResult<()> {
        self.registry.broadcast_build_finished(result)
    }

    /// Run `action` only if at least one problem was recorded.
    pub fn run_if_problems<F: FnOnce()>(&self, action: F) {
        let has_problems = !lock_state(&self.state).is_empty();
        if has_problems {
            action();
        }
    }

    /// Outcome implied by the current state, `None` once the threshold fired.
    pub fn outcome(&self) -> Option<BuildOutcome> {
        let state = lock_state(&self.state);
        if state.threshold_reached() {
            return None;
        }
        Some(BuildOutcome::derive(
            state.len(),
            state.summary_requested(),
            self.config.fail_on_problems(),
        ))
    }

    pub fn problem_count(&self) -> usize {
        lock_state(&self.state).len()
    }

    /// Snapshot of the problem log
    pub fn problems(&self) -> Vec<Problem> {
        lock_state(&self.state).problems().to_vec()
    }

    pub fn report_file(&self) -> PathBuf {
        self.report.report_file()
    }

    pub fn config(&self) -> &ProblemsConfig {
        &self.config
    }
}

impl ProblemListener for BuildProblems {
    fn on_problem(&self, problem: &Problem) -> ProblemsResult<()> {
        self.registry.broadcast_problem(problem)
    }
}

impl Drop for BuildProblems {
    fn drop(&mut self) {
        self.registry.remove_listener(self.collector_id);
        self.registry.remove_listener(self.arbiter_id);
        debug!(problems = self.problem_count(), "Configuration cache problem handling closed");
    }
}
