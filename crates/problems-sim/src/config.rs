use anyhow::{Context, Result};
use cache_problems::ProblemsConfig;
use std::path::{Path, PathBuf};

/// Default report directory, relative to the working directory.
pub const DEFAULT_REPORT_DIR: &str = "build/reports/configuration-cache";

/// Environment variable overriding [`DEFAULT_REPORT_DIR`]; `--report-dir` wins over it.
pub const ENV_REPORT_DIR: &str = "CACHE_PROBLEMS_REPORT_DIR";

/// Command-line overrides applied on top of file and environment settings.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub max_problems: Option<usize>,
    /// `Some(true)` for `--fail-on-problems`, `Some(false)` for `--warn`.
    pub fail_on_problems: Option<bool>,
}

/// Top-level simulation configuration.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub problems: ProblemsConfig,
    /// Problems to report across all workers.
    pub problem_count: usize,
    /// Parallel workers reporting problems.
    pub workers: usize,
    /// Nested builds completing before the root build.
    pub nested_builds: Vec<String>,
    pub report_dir: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            problems: ProblemsConfig::default(),
            problem_count: 0,
            workers: 1,
            nested_builds: Vec::new(),
            report_dir: report_dir_from(|key| std::env::var(key).ok()),
        }
    }
}

fn report_dir_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup(ENV_REPORT_DIR)
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR))
}

/// Resolve problem settings: defaults < config file < environment < flags.
pub fn resolve_problems_config(
    config_file: Option<&Path>,
    flags: &FlagOverrides,
) -> Result<ProblemsConfig> {
    let base = match config_file {
        Some(path) => ProblemsConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProblemsConfig::default(),
    };
    let from_env = base
        .with_env_overrides()
        .context("Invalid problem settings in environment")?;

    ProblemsConfig::new(
        flags.max_problems.unwrap_or(from_env.max_problems()),
        flags
            .fail_on_problems
            .unwrap_or(from_env.fail_on_problems()),
    )
    .context("Invalid problem settings on command line")
}
