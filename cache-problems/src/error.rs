//! Error types for problem collection and outcome arbitration.
//!
//! The two problem-driven fatal kinds (`TooManyProblems` and
//! `ProblemsAtBuildEnd`) both carry the complete problem log and the report
//! location so callers can present them without reaching back into the
//! collector.

use std::path::{Path, PathBuf};

use crate::problem::Problem;

/// Result type alias for problem pipeline operations
pub type ProblemsResult<T> = Result<T, ProblemsError>;

/// Errors raised by the problem pipeline
#[derive(Debug, thiserror::Error)]
pub enum ProblemsError {
    /// The hard cap was reached while reporting; the build must abort now.
    #[error(
        "Maximum number of configuration cache problems has been reached ({} problems). \
         See the complete report at {}",
        .problems.len(),
        .report_path.display()
    )]
    TooManyProblems {
        problems: Vec<Problem>,
        report_path: PathBuf,
    },

    /// The root build completed with problems while failing on problems.
    #[error(
        "Configuration cache problems found in this build ({} problems). \
         See the complete report at {}",
        .problems.len(),
        .report_path.display()
    )]
    ProblemsAtBuildEnd {
        problems: Vec<Problem>,
        report_path: PathBuf,
    },

    /// A problem arrived after the threshold already aborted the build.
    #[error("Build already aborted after reaching {max_problems} configuration cache problems")]
    Aborted { max_problems: usize },

    /// Failed to write the report to disk.
    #[error("Failed to write problem report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a previously written report.
    #[error("Failed to read problem report {path}: {source}")]
    ReportRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the report.
    #[error("Failed to serialize problem report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

impl ProblemsError {
    /// Whether this is one of the two problem-driven build failures.
    pub fn is_fatal_problem(&self) -> bool {
        matches!(self, Self::TooManyProblems { .. } | Self::ProblemsAtBuildEnd { .. })
    }

    /// Problems carried by this error, empty for non-problem errors.
    pub fn problems(&self) -> &[Problem] {
        match self {
            Self::TooManyProblems { problems, .. } | Self::ProblemsAtBuildEnd { problems, .. } => {
                problems
            }
            _ => &[],
        }
    }

    /// Report location referenced by this error, if any.
    pub fn report_path(&self) -> Option<&Path> {
        match self {
            Self::TooManyProblems { report_path, .. }
            | Self::ProblemsAtBuildEnd { report_path, .. } => Some(report_path),
            Self::ReportWrite { path, .. } | Self::ReportRead { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Errors from loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_problems must be greater than zero")]
    InvalidMaxProblems,

    #[error("Failed to read config {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: String, value: String },
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
