//! End-to-end build scenarios through the public API.
//!
//! Each test runs one simulated build against a real `FileReport` in a
//! temp directory and checks what ends up on disk and what the build sees.

use std::sync::{Arc, Mutex};

use cache_problems::{
    BuildOutcome, BuildProblems, BuildResult, FileReport, ListenerRegistry, Problem,
    ProblemReport, ProblemsConfig, ProblemsError, ProblemsResult, ReportDocument,
};

/// FileReport wrapper that also counts console summaries.
struct CountingReport {
    inner: FileReport,
    summaries: Mutex<usize>,
}

impl CountingReport {
    fn new(dir: &tempfile::TempDir) -> Arc<Self> {
        Arc::new(Self {
            inner: FileReport::new(dir.path().join("reports")),
            summaries: Mutex::new(0),
        })
    }

    fn summaries(&self) -> usize {
        *self.summaries.lock().unwrap()
    }
}

impl ProblemReport for CountingReport {
    fn report_file(&self) -> std::path::PathBuf {
        self.inner.report_file()
    }

    fn write_report_files(&self, problems: &[Problem]) -> ProblemsResult<()> {
        self.inner.write_report_files(problems)
    }

    fn log_console_summary(&self, problems: &[Problem]) {
        *self.summaries.lock().unwrap() += 1;
        self.inner.log_console_summary(problems);
    }
}

fn start_build(max: usize, fail: bool, report: &Arc<CountingReport>) -> BuildProblems {
    BuildProblems::begin(
        ProblemsConfig::new(max, fail).unwrap(),
        report.clone(),
        ListenerRegistry::new().shared(),
    )
}

fn problem(i: usize) -> Problem {
    Problem::new(
        format!("task ':lib{i}:compileJava' field 'classpath'"),
        "cannot serialize object of type 'org.example.Connection'",
    )
}

/// Scenario 1: soft mode under the cap summarizes and succeeds
#[test]
fn test_soft_mode_under_cap_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let report = CountingReport::new(&dir);
    let build = start_build(3, false, &report);

    build.report(problem(1)).unwrap();
    build.report(problem(2)).unwrap();
    build.build_finished(&BuildResult::root()).unwrap();

    assert_eq!(build.outcome(), Some(BuildOutcome::SummarizedSuccess));
    assert_eq!(report.summaries(), 1);

    let doc = ReportDocument::load(report.report_file()).unwrap();
    assert_eq!(doc.total_problems, 2);
    assert_eq!(doc.problems, build.problems());
}

/// Scenario 2: soft mode still aborts on the cap-reaching report
#[test]
fn test_soft_mode_aborts_on_cap() {
    let dir = tempfile::tempdir().unwrap();
    let report = CountingReport::new(&dir);
    let build = start_build(3, false, &report);

    build.report(problem(1)).unwrap();
    build.report(problem(2)).unwrap();
    let err = build.report(problem(3)).unwrap_err();

    match &err {
        ProblemsError::TooManyProblems {
            problems,
            report_path,
        } => {
            assert_eq!(problems.len(), 3);
            assert_eq!(report_path, &report.report_file());
        }
        other => panic!("expected TooManyProblems, got {other:?}"),
    }
    assert!(err.is_fatal_problem());
    assert!(!report.report_file().exists(), "report is not written at abort time");
    assert_eq!(report.summaries(), 0);
}

/// Scenario 3: fail mode writes the report and then fails the build
#[test]
fn test_fail_mode_fails_at_build_end() {
    let dir = tempfile::tempdir().unwrap();
    let report = CountingReport::new(&dir);
    let build = start_build(10, true, &report);

    build.report(problem(1)).unwrap();
    build.report(problem(2)).unwrap();
    let err = build.build_finished(&BuildResult::root()).unwrap_err();

    assert!(matches!(err, ProblemsError::ProblemsAtBuildEnd { .. }));
    assert_eq!(err.problems().len(), 2);
    assert!(
        report.report_file().exists(),
        "report must exist before the failure surfaces"
    );
    assert_eq!(report.summaries(), 0);
}

/// Scenario 4: no problems, no report, no error
#[test]
fn test_no_problems_stays_silent() {
    let dir = tempfile::tempdir().unwrap();
    let report = CountingReport::new(&dir);
    let build = start_build(10, true, &report);

    build.build_finished(&BuildResult::root()).unwrap();

    assert_eq!(build.outcome(), Some(BuildOutcome::SilentSuccess));
    assert!(!report.report_file().exists());
    assert_eq!(report.summaries(), 0);

    let mut ran = false;
    build.run_if_problems(|| ran = true);
    assert!(!ran);
}

#[test]
fn test_nested_build_completion_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let report = CountingReport::new(&dir);
    let build = start_build(10, true, &report);

    build.report(problem(1)).unwrap();
    build
        .build_finished(&BuildResult::nested(":buildSrc"))
        .unwrap();
    assert!(!report.report_file().exists());

    let err = build.build_finished(&BuildResult::root()).unwrap_err();
    assert!(matches!(err, ProblemsError::ProblemsAtBuildEnd { .. }));
}

#[test]
fn test_threshold_abort_then_completion_persists_report_only() {
    let dir = tempfile::tempdir().unwrap();
    let report = CountingReport::new(&dir);
    let build = start_build(2, true, &report);

    build.report(problem(1)).unwrap();
    build.report(problem(2)).unwrap_err();

    build.build_finished(&BuildResult::root()).unwrap();

    let doc = ReportDocument::load(report.report_file()).unwrap();
    assert_eq!(doc.total_problems, 2);
    assert_eq!(report.summaries(), 0);
    assert_eq!(build.outcome(), None);
}
