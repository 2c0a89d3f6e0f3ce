//! Problem Collector: accumulates problems and enforces the hard cap
//!
//! The append and the threshold check happen in one critical section on
//! [`SharedProblemState`]. Only the append that brings the log to exactly
//! `max_problems` raises [`ProblemsError::TooManyProblems`]; the same
//! critical section seals the log, and every later report is rejected with
//! [`ProblemsError::Aborted`] without being appended.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::config::ProblemsConfig;
use crate::error::{ProblemsError, ProblemsResult};
use crate::events::ProblemListener;
use crate::problem::Problem;

/// Problem log and flags for one top-level build invocation.
#[derive(Debug, Default)]
pub struct ProblemState {
    problems: Vec<Problem>,
    summary_requested: bool,
    threshold_reached: bool,
    report_written: bool,
}

impl ProblemState {
    /// Problems in reporting order
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// A console summary is pending for build completion.
    pub fn summary_requested(&self) -> bool {
        self.summary_requested
    }

    /// The hard cap was hit; the log is sealed.
    pub fn threshold_reached(&self) -> bool {
        self.threshold_reached
    }

    pub fn report_written(&self) -> bool {
        self.report_written
    }

    /// Claim the one report write of this build. Returns false if it was
    /// already claimed.
    pub(crate) fn claim_report_write(&mut self) -> bool {
        !std::mem::replace(&mut self.report_written, true)
    }
}

/// Shared reference to the problem state, guarded by a single mutex
pub type SharedProblemState = Arc<Mutex<ProblemState>>;

/// Create empty shared state for a new build
pub fn new_shared_state() -> SharedProblemState {
    Arc::new(Mutex::new(ProblemState::default()))
}

/// Lock the state, recovering from poisoning.
///
/// Every mutation is a complete critical section with no calls out, so a
/// poisoned lock still holds consistent state.
pub fn lock_state(state: &SharedProblemState) -> MutexGuard<'_, ProblemState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Listener that appends reported problems to the log
pub struct ProblemCollector {
    config: ProblemsConfig,
    state: SharedProblemState,
    report_path: PathBuf,
}

impl ProblemCollector {
    pub fn new(config: ProblemsConfig, state: SharedProblemState, report_path: PathBuf) -> Self {
        Self {
            config,
            state,
            report_path,
        }
    }

    /// Append `problem` and apply the threshold and summary rules.
    pub fn collect(&self, problem: &Problem) -> ProblemsResult<()> {
        let max_problems = self.config.max_problems();
        let mut state = lock_state(&self.state);

        if state.threshold_reached {
            debug!(trace = %problem.trace, "Problem rejected, build already aborted");
            return Err(ProblemsError::Aborted { max_problems });
        }

        state.problems.push(problem.clone());
        let count = state.problems.len();

        if count >= max_problems {
            state.summary_requested = false;
            state.threshold_reached = true;
            warn!(count, max_problems, "Maximum number of problems reached");
            return Err(ProblemsError::TooManyProblems {
                problems: state.problems.clone(),
                report_path: self.report_path.clone(),
            });
        }

        if !self.config.fail_on_problems() {
            state.summary_requested = true;
        }
        debug!(count, trace = %problem.trace, "Problem collected");
        Ok(())
    }
}

impl ProblemListener for ProblemCollector {
    fn on_problem(&self, problem: &Problem) -> ProblemsResult<()> {
        self.collect(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(max: usize, fail: bool) -> (ProblemCollector, SharedProblemState) {
        let state = new_shared_state();
        let config = ProblemsConfig::new(max, fail).unwrap();
        let collector =
            ProblemCollector::new(config, Arc::clone(&state), PathBuf::from("report.json"));
        (collector, state)
    }

    fn problem(i: usize) -> Problem {
        Problem::new(format!("task ':t{i}'"), "cannot serialize")
    }

    #[test]
    fn test_threshold_fires_on_exactly_the_nth_report() {
        for max in 1..=6 {
            let (collector, state) = collector(max, true);
            for i in 1..max {
                assert!(collector.collect(&problem(i)).is_ok(), "report {i} of cap {max}");
            }

            let err = collector.collect(&problem(max)).unwrap_err();
            match err {
                ProblemsError::TooManyProblems {
                    problems,
                    report_path,
                } => {
                    assert_eq!(problems.len(), max);
                    assert_eq!(report_path, PathBuf::from("report.json"));
                }
                other => panic!("expected TooManyProblems, got {other:?}"),
            }
            assert!(lock_state(&state).threshold_reached());
        }
    }

    #[test]
    fn test_soft_mode_requests_summary() {
        let (collector, state) = collector(10, false);
        assert!(!lock_state(&state).summary_requested());

        collector.collect(&problem(1)).unwrap();
        collector.collect(&problem(2)).unwrap();

        let state = lock_state(&state);
        assert!(state.summary_requested());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_fail_mode_never_requests_summary() {
        let (collector, state) = collector(10, true);
        collector.collect(&problem(1)).unwrap();
        assert!(!lock_state(&state).summary_requested());
    }

    #[test]
    fn test_threshold_clears_pending_summary() {
        let (collector, state) = collector(3, false);
        collector.collect(&problem(1)).unwrap();
        collector.collect(&problem(2)).unwrap();
        assert!(lock_state(&state).summary_requested());

        let err = collector.collect(&problem(3)).unwrap_err();
        assert!(matches!(err, ProblemsError::TooManyProblems { .. }));
        assert!(!lock_state(&state).summary_requested());
    }

    #[test]
    fn test_reports_after_threshold_are_rejected() {
        let (collector, state) = collector(2, true);
        collector.collect(&problem(1)).unwrap();
        collector.collect(&problem(2)).unwrap_err();

        let err = collector.collect(&problem(3)).unwrap_err();
        assert!(matches!(err, ProblemsError::Aborted { max_problems: 2 }));
        assert_eq!(lock_state(&state).len(), 2);
    }

    #[test]
    fn test_log_preserves_insertion_order() {
        let (collector, state) = collector(10, true);
        let reported: Vec<_> = (0..5).map(problem).collect();
        for p in &reported {
            collector.collect(p).unwrap();
        }
        assert_eq!(lock_state(&state).problems(), reported.as_slice());
    }

    #[test]
    fn test_report_write_claimed_once() {
        let mut state = ProblemState::default();
        assert!(state.claim_report_write());
        assert!(!state.claim_report_write());
        assert!(state.report_written());
    }
}
