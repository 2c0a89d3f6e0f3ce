//! Outcome Arbiter: decides how a build with problems ends
//!
//! Runs once per root build completion, after all parallel work joined.
//! The report is persisted before any outcome is decided so diagnostics
//! survive a failing build.
//!
//! ```text
//! build_finished(result)
//!   ├─ nested build, empty log, report already written → nothing
//!   ├─ write report
//!   ├─ threshold already fired           → nothing more (error already raised)
//!   ├─ summary requested                 → console summary, SummarizedSuccess
//!   ├─ fail_on_problems                  → ProblemsAtBuildEnd
//!   └─ otherwise                         → SilentSuccess
//! ```

use std::sync::Arc;
use tracing::{debug, info};

use crate::collector::{lock_state, SharedProblemState};
use crate::config::ProblemsConfig;
use crate::error::{ProblemsError, ProblemsResult};
use crate::events::{BuildListener, BuildResult};
use crate::report::ProblemReport;

/// How a build ended with respect to cache problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// No user-facing signal; a report may exist on disk.
    SilentSuccess,
    /// Build succeeded and a console summary was logged.
    SummarizedSuccess,
    /// Build fails because of the recorded problems.
    Failed,
}

impl BuildOutcome {
    /// Derive the outcome from the state at build completion.
    pub fn derive(problem_count: usize, summary_requested: bool, fail_on_problems: bool) -> Self {
        if problem_count == 0 {
            Self::SilentSuccess
        } else if summary_requested {
            Self::SummarizedSuccess
        } else if fail_on_problems {
            Self::Failed
        } else {
            Self::SilentSuccess
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SilentSuccess => write!(f, "silent_success"),
            Self::SummarizedSuccess => write!(f, "summarized_success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Build listener applying the end-of-build rules
pub struct OutcomeArbiter {
    config: ProblemsConfig,
    state: SharedProblemState,
    report: Arc<dyn ProblemReport>,
}

impl OutcomeArbiter {
    pub fn new(
        config: ProblemsConfig,
        state: SharedProblemState,
        report: Arc<dyn ProblemReport>,
    ) -> Self {
        Self {
            config,
            state,
            report,
        }
    }

    /// Handle a build completion. Returns the outcome when this event
    /// decided one, `None` when the event was ignored.
    pub fn decide(&self, result: &BuildResult) -> ProblemsResult<Option<BuildOutcome>> {
        if !result.is_root {
            debug!(build = %result.build_path, "Ignoring nested build completion");
            return Ok(None);
        }

        let (problems, summary_requested, threshold_reached) = {
            let mut state = lock_state(&self.state);
            if state.is_empty() {
                return Ok(Some(BuildOutcome::SilentSuccess));
            }
            if !state.claim_report_write() {
                debug!("Report already written for this build");
                return Ok(None);
            }
            (
                state.problems().to_vec(),
                state.summary_requested(),
                state.threshold_reached(),
            )
        };

        self.report.write_report_files(&problems)?;

        if threshold_reached {
            info!(
                problems = problems.len(),
                report = %self.report.report_file().display(),
                "Report written after threshold abort"
            );
            return Ok(None);
        }

        let outcome = BuildOutcome::derive(
            problems.len(),
            summary_requested,
            self.config.fail_on_problems(),
        );
        info!(problems = problems.len(), %outcome, "Build outcome decided");

        match outcome {
            BuildOutcome::SummarizedSuccess => {
                self.report.log_console_summary(&problems);
                Ok(Some(outcome))
            }
            BuildOutcome::Failed => Err(ProblemsError::ProblemsAtBuildEnd {
                problems,
                report_path: self.report.report_file(),
            }),
            BuildOutcome::SilentSuccess => Ok(Some(outcome)),
        }
    }
}

impl BuildListener for OutcomeArbiter {
    fn build_finished(&self, result: &BuildResult) -> ProblemsResult<()> {
        self.decide(result).map(|_| ())
    }
}
