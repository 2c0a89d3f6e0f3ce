//! Listener traits and event payloads for the problem pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ProblemsResult;
use crate::problem::Problem;

/// Path of the root build.
pub const ROOT_BUILD_PATH: &str = ":";

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Completion event for one build in the build tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Display path of the build (`:` for the root)
    pub build_path: String,
    /// Whether this is the outermost build invocation
    pub is_root: bool,
}

impl BuildResult {
    /// Completion of the root build.
    pub fn root() -> Self {
        Self {
            build_path: ROOT_BUILD_PATH.to_string(),
            is_root: true,
        }
    }

    /// Completion of a nested or included build.
    pub fn nested(build_path: impl Into<String>) -> Self {
        Self {
            build_path: build_path.into(),
            is_root: false,
        }
    }
}

/// Receives every reported problem.
///
/// Returning an error aborts the broadcast and propagates to the caller
/// that reported the problem.
pub trait ProblemListener: Send + Sync {
    fn on_problem(&self, problem: &Problem) -> ProblemsResult<()>;
}

/// Receives build completion events.
pub trait BuildListener: Send + Sync {
    fn build_finished(&self, result: &BuildResult) -> ProblemsResult<()>;
}
