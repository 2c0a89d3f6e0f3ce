//! Configuration Cache Problems Library
//!
//! Aggregates the problems found while reusing a configuration cache entry
//! and decides how the build ends because of them:
//!
//! - Producers report problems through [`BuildProblems::report`], possibly
//!   from many workers at once.
//! - The [`ProblemCollector`] appends each problem and aborts the build the
//!   moment the configured cap is reached.
//! - At root build completion the [`OutcomeArbiter`] writes the report and
//!   then fails the build, logs a console summary, or stays silent.
//!
//! # Outcomes
//!
//! | Problems at completion | `fail_on_problems` | Result                          |
//! |------------------------|--------------------|---------------------------------|
//! | 0                      | any                | success, no report              |
//! | `0 < n < max`          | `false`            | report + console summary        |
//! | `0 < n < max`          | `true`             | report + `ProblemsAtBuildEnd`   |
//! | `n == max`             | any                | `TooManyProblems` while reporting |
//!
//! # Usage
//!
//! ```ignore
//! use cache_problems::{BuildProblems, BuildResult, FileReport, ListenerRegistry, Problem, ProblemsConfig};
//! use std::sync::Arc;
//!
//! let registry = ListenerRegistry::new().shared();
//! let config = ProblemsConfig::default().with_env_overrides()?;
//! let problems = BuildProblems::begin(config, Arc::new(FileReport::new("build/reports")), registry);
//!
//! problems.report(Problem::new("task ':app:jar'", "cannot serialize object of type Thread"))?;
//! problems.build_finished(&BuildResult::root())?;
//! ```

pub mod arbiter;
pub mod collector;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod problem;
pub mod report;

pub use arbiter::{BuildOutcome, OutcomeArbiter};
pub use collector::{ProblemCollector, ProblemState, SharedProblemState};
pub use config::{ProblemsConfig, DEFAULT_MAX_PROBLEMS, ENV_FAIL_ON_PROBLEMS, ENV_MAX_PROBLEMS};
pub use error::{ConfigError, ConfigResult, ProblemsError, ProblemsResult};
pub use events::{
    BuildListener, BuildResult, ListenerId, ListenerRegistry, ProblemListener,
    SharedListenerRegistry,
};
pub use lifecycle::BuildProblems;
pub use problem::{Problem, ProblemId};
pub use report::{FileReport, ProblemReport, ReportDocument};
