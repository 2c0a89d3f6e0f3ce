//! File-backed problem report.
//!
//! Writes a JSON document next to the build's other reports. The write
//! goes through a temp file and a rename so a crashed build never leaves a
//! truncated report behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::summary::{render_console_summary, unique_problem_count};
use super::ProblemReport;
use crate::error::{ProblemsError, ProblemsResult};
use crate::problem::Problem;

/// Name of the report inside the report directory.
pub const REPORT_FILE_NAME: &str = "configuration-cache-report.json";

/// Serialized report contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub total_problems: usize,
    pub unique_problems: usize,
    /// Problems in the order they were reported
    pub problems: Vec<Problem>,
}

impl ReportDocument {
    pub fn new(problems: &[Problem]) -> Self {
        Self {
            generated_at: Utc::now(),
            total_problems: problems.len(),
            unique_problems: unique_problem_count(problems),
            problems: problems.to_vec(),
        }
    }

    /// Read a previously written report.
    pub fn load(path: impl AsRef<Path>) -> ProblemsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ProblemsError::ReportRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Report written under a fixed directory
#[derive(Debug, Clone)]
pub struct FileReport {
    report_dir: PathBuf,
}

impl FileReport {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> ProblemsError {
        ProblemsError::ReportWrite {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ProblemReport for FileReport {
    fn report_file(&self) -> PathBuf {
        self.report_dir.join(REPORT_FILE_NAME)
    }

    fn write_report_files(&self, problems: &[Problem]) -> ProblemsResult<()> {
        let path = self.report_file();
        let temp_path = path.with_extension("json.tmp");

        std::fs::create_dir_all(&self.report_dir)
            .map_err(|e| self.io_error(&self.report_dir, e))?;

        let content = serde_json::to_string_pretty(&ReportDocument::new(problems))?;
        std::fs::write(&temp_path, content).map_err(|e| self.io_error(&temp_path, e))?;

        if let Err(e) = std::fs::rename(&temp_path, &path) {
            if let Err(cleanup) = std::fs::remove_file(&temp_path) {
                warn!(path = %temp_path.display(), "Failed to remove temp report: {}", cleanup);
            }
            return Err(self.io_error(&path, e));
        }

        debug!(path = %path.display(), problems = problems.len(), "Problem report written");
        Ok(())
    }

    fn log_console_summary(&self, problems: &[Problem]) {
        warn!("{}", render_console_summary(problems, &self.report_file()));
    }
}
