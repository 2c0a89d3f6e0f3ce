mod config;
mod simulation;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use config::{FlagOverrides, SimConfig};
use simulation::SimOutcome;
use tracing::{error, info};

/// Simulate a build reusing a configuration cache entry and report how
/// the problems found along the way decide its outcome.
#[derive(Debug, Parser)]
#[command(name = "problems-sim", version)]
struct Cli {
    /// TOML file with `max_problems` / `fail_on_problems`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Abort the build once this many problems are reported
    #[arg(long)]
    max_problems: Option<usize>,

    /// Fail the build at completion if any problem was reported
    #[arg(long, conflicts_with = "warn")]
    fail_on_problems: bool,

    /// Only summarize problems instead of failing the build
    #[arg(long)]
    warn: bool,

    /// Problems to report across all workers
    #[arg(long, default_value_t = 0)]
    problems: usize,

    /// Parallel workers reporting problems
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Nested build paths completing before the root build
    #[arg(long = "nested-build")]
    nested_builds: Vec<String>,

    /// Directory receiving the problem report [env: CACHE_PROBLEMS_REPORT_DIR]
    #[arg(long)]
    report_dir: Option<PathBuf>,
}

impl Cli {
    fn flag_overrides(&self) -> FlagOverrides {
        let fail_on_problems = if self.fail_on_problems {
            Some(true)
        } else if self.warn {
            Some(false)
        } else {
            None
        };
        FlagOverrides {
            max_problems: self.max_problems,
            fail_on_problems,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let defaults = SimConfig::default();
    let config = SimConfig {
        problems: config::resolve_problems_config(cli.config.as_deref(), &cli.flag_overrides())?,
        problem_count: cli.problems,
        workers: cli.workers,
        nested_builds: cli.nested_builds.clone(),
        report_dir: cli.report_dir.clone().unwrap_or(defaults.report_dir),
    };

    info!(
        max_problems = config.problems.max_problems(),
        fail_on_problems = config.problems.fail_on_problems(),
        "Problem settings resolved"
    );

    match simulation::run(&config).await? {
        SimOutcome::Succeeded { outcome, problems } => {
            info!(%outcome, problems, "BUILD SUCCESSFUL");
            Ok(ExitCode::SUCCESS)
        }
        SimOutcome::Failed(e) => {
            error!("{e}");
            error!("BUILD FAILED");
            Ok(ExitCode::FAILURE)
        }
    }
}
