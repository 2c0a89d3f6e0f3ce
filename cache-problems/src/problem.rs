//! Problem records reported while reusing a configuration cache entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for problems
pub type ProblemId = String;

/// Trace used when the producer cannot say where the problem was found.
pub const UNKNOWN_TRACE: &str = "unknown location";

/// A single detected incompatibility that prevents safe reuse of cached
/// build state. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique identifier
    pub id: ProblemId,
    /// Where the problem was found, e.g. `task ':app:compileJava' field 'classpath'`
    pub trace: String,
    /// Human-readable description
    pub message: String,
    /// Optional categorization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Documentation anchor explaining the problem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_section: Option<String>,
    /// Rendered underlying error, if one caused the problem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// When the problem was recorded
    pub recorded_at: DateTime<Utc>,
}

impl Problem {
    /// Create a new problem at `trace` with `message`.
    pub fn new(trace: impl Into<String>, message: impl Into<String>) -> Self {
        let trace = trace.into();
        Self {
            id: Uuid::new_v4().to_string(),
            trace: if trace.trim().is_empty() {
                UNKNOWN_TRACE.to_string()
            } else {
                trace
            },
            message: message.into(),
            category: None,
            documentation_section: None,
            cause: None,
            recorded_at: Utc::now(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the documentation section
    pub fn with_documentation(mut self, section: impl Into<String>) -> Self {
        self.documentation_section = Some(section.into());
        self
    }

    /// Attach the underlying error
    pub fn with_cause(mut self, cause: &dyn std::error::Error) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// Key under which two problems count as the same for summaries.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.trace, &self.message)
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.trace, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_problem_has_unique_id() {
        let a = Problem::new("task ':a'", "cannot serialize Thread");
        let b = Problem::new("task ':a'", "cannot serialize Thread");
        assert_ne!(a.id, b.id);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_blank_trace_falls_back() {
        let p = Problem::new("  ", "message");
        assert_eq!(p.trace, UNKNOWN_TRACE);
    }

    #[test]
    fn test_builder_and_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let p = Problem::new("field 'x'", "unsupported type")
            .with_category("serialization")
            .with_documentation("config_cache:requirements")
            .with_cause(&io);

        assert_eq!(p.category.as_deref(), Some("serialization"));
        assert_eq!(p.cause.as_deref(), Some("disk gone"));
        assert_eq!(p.to_string(), "field 'x': unsupported type");
    }

    #[test]
    fn test_serde_skips_empty_optionals() {
        let p = Problem::new("t", "m");
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("category").is_none());
        assert_eq!(json["trace"], "t");
    }
}
