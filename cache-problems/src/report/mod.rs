//! Problem report: persisted diagnostics and the console summary
//!
//! The pipeline only talks to [`ProblemReport`]; [`FileReport`] is the
//! on-disk implementation used by the build driver.

pub mod file;
pub mod summary;

use std::path::PathBuf;

use crate::error::ProblemsResult;
use crate::problem::Problem;

pub use file::{FileReport, ReportDocument, REPORT_FILE_NAME};
pub use summary::{render_console_summary, unique_problem_count, MAX_CONSOLE_PROBLEMS};

/// Report collaborator for the problem pipeline.
pub trait ProblemReport: Send + Sync {
    /// Location of the report, known before it is written.
    fn report_file(&self) -> PathBuf;

    /// Persist the complete problem log.
    fn write_report_files(&self, problems: &[Problem]) -> ProblemsResult<()>;

    /// Emit a human-readable summary of the problems.
    fn log_console_summary(&self, problems: &[Problem]);
}
