//! Problem handling configuration.
//!
//! Layered the same way the rest of the build reads its settings:
//! built-in defaults, then an optional TOML file, then environment
//! overrides. Callers apply command-line flags last.

use serde::Deserialize;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Default hard cap on problems per build.
pub const DEFAULT_MAX_PROBLEMS: usize = 512;

/// Environment variable overriding `max_problems`.
pub const ENV_MAX_PROBLEMS: &str = "CACHE_PROBLEMS_MAX_PROBLEMS";

/// Environment variable overriding `fail_on_problems`.
pub const ENV_FAIL_ON_PROBLEMS: &str = "CACHE_PROBLEMS_FAIL_ON_PROBLEMS";

/// Immutable problem handling settings for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemsConfig {
    max_problems: usize,
    fail_on_problems: bool,
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    max_problems: Option<usize>,
    fail_on_problems: Option<bool>,
}

impl ProblemsConfig {
    /// Create a validated configuration.
    pub fn new(max_problems: usize, fail_on_problems: bool) -> ConfigResult<Self> {
        if max_problems == 0 {
            return Err(ConfigError::InvalidMaxProblems);
        }
        Ok(Self {
            max_problems,
            fail_on_problems,
        })
    }

    /// Hard cap; reaching it aborts the build.
    pub fn max_problems(&self) -> usize {
        self.max_problems
    }

    /// Whether problems under the cap fail the build at completion.
    pub fn fail_on_problems(&self) -> bool {
        self.fail_on_problems
    }

    /// Parse TOML, filling missing keys from defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();
        Self::new(
            file.max_problems.unwrap_or(defaults.max_problems),
            file.fail_on_problems.unwrap_or(defaults.fail_on_problems),
        )
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `CACHE_PROBLEMS_*` environment overrides.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides_from(|var| std::env::var(var).ok())
    }

    fn with_overrides_from(self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut max_problems = self.max_problems;
        let mut fail_on_problems = self.fail_on_problems;

        if let Some(value) = lookup(ENV_MAX_PROBLEMS) {
            max_problems = value
                .trim()
                .parse()
                .map_err(|_| invalid_env(ENV_MAX_PROBLEMS, &value))?;
        }
        if let Some(value) = lookup(ENV_FAIL_ON_PROBLEMS) {
            fail_on_problems =
                parse_flag(&value).ok_or_else(|| invalid_env(ENV_FAIL_ON_PROBLEMS, &value))?;
        }

        Self::new(max_problems, fail_on_problems)
    }
}

impl Default for ProblemsConfig {
    fn default() -> Self {
        Self {
            max_problems: DEFAULT_MAX_PROBLEMS,
            fail_on_problems: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn invalid_env(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    }
}
