//! Console summary rendering.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::problem::Problem;

/// Unique problems listed before the summary is cut short.
pub const MAX_CONSOLE_PROBLEMS: usize = 15;

fn unique_problems(problems: &[Problem]) -> Vec<&Problem> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for problem in problems {
        if seen.insert(problem.dedup_key()) {
            unique.push(problem);
        }
    }
    unique
}

/// Number of distinct (trace, message) pairs.
pub fn unique_problem_count(problems: &[Problem]) -> usize {
    unique_problems(problems).len()
}

fn pluralize(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// Render the summary logged when problems are reported without failing.
pub fn render_console_summary(problems: &[Problem], report_file: &Path) -> String {
    let unique = unique_problems(problems);
    let total = problems.len();

    let mut out = format!(
        "{} {} found storing the configuration cache",
        pluralize(total, "problem"),
        if total == 1 { "was" } else { "were" }
    );
    if unique.len() < total {
        out.push_str(&format!(", {} of which seem unique", unique.len()));
    }
    out.push('.');

    for problem in unique.iter().take(MAX_CONSOLE_PROBLEMS) {
        out.push_str(&format!("\n- {problem}"));
    }
    if unique.len() > MAX_CONSOLE_PROBLEMS {
        let rest = unique.len() - MAX_CONSOLE_PROBLEMS;
        out.push_str(&format!(
            "\nplus {rest} more {}. Please see the report for details.",
            if rest == 1 { "problem" } else { "problems" }
        ));
    }

    out.push_str(&format!(
        "\n\nSee the complete report at file://{}",
        absolute_report_path(report_file).display()
    ));
    out
}

// A relative path would turn its first component into the URL host.
fn absolute_report_path(report_file: &Path) -> PathBuf {
    std::path::absolute(report_file).unwrap_or_else(|_| report_file.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_problem() {
        let problems = vec![Problem::new("task ':a'", "cannot serialize Thread")];
        let text = render_console_summary(&problems, Path::new("/r/report.json"));

        assert!(text.starts_with("1 problem was found storing the configuration cache."));
        assert!(text.contains("- task ':a': cannot serialize Thread"));
        assert!(text.ends_with("See the complete report at file:///r/report.json"));
    }

    #[test]
    fn test_relative_report_path_is_made_absolute() {
        let problems = vec![Problem::new("task ':a'", "x")];
        let text = render_console_summary(&problems, Path::new("reports/r.json"));

        let expected = std::env::current_dir().unwrap().join("reports/r.json");
        assert!(text.ends_with(&format!("file://{}", expected.display())));
        assert!(text.contains("file:///"));
    }

    #[test]
    fn test_duplicates_are_counted_once() {
        let problems = vec![
            Problem::new("task ':a'", "x"),
            Problem::new("task ':a'", "x"),
            Problem::new("task ':b'", "x"),
        ];
        assert_eq!(unique_problem_count(&problems), 2);

        let text = render_console_summary(&problems, Path::new("r.json"));
        assert!(text.starts_with(
            "3 problems were found storing the configuration cache, 2 of which seem unique."
        ));
        assert_eq!(text.matches("\n- ").count(), 2);
    }

    #[test]
    fn test_long_lists_are_truncated() {
        let problems: Vec<_> = (0..MAX_CONSOLE_PROBLEMS + 2)
            .map(|i| Problem::new(format!("task ':t{i}'"), "m"))
            .collect();

        let text = render_console_summary(&problems, Path::new("r.json"));

        assert_eq!(text.matches("\n- ").count(), MAX_CONSOLE_PROBLEMS);
        assert!(text.contains("plus 2 more problems."));
    }
}
