//! Outcomes collected by the local runner.
//!
//! Every type here serializes with `serde`, so a [`RunReport`] can be written
//! out as JSON by the caller.

use core::time::Duration;

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    /// The body and every per-test hook completed.
    Passed,
    /// A hook or the body returned an error or panicked.
    Failed(String),
    /// The test was not run.
    Skipped(Option<String>),
    /// The test ran under a `todo` marker; failures do not count.
    Todo {
        /// Reason attached to the marker.
        reason: Option<String>,
        /// Whether the test would have passed.
        passed: bool,
    },
    /// The body did not complete within its timeout.
    TimedOut(Duration),
    /// The test's abort signal fired.
    Cancelled,
}

impl TestOutcome {
    /// Returns whether the outcome counts as a failure of the run.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::TimedOut(_))
    }
}

/// Report of one test case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    /// Registered test name.
    pub name: String,
    /// How the test ended.
    pub outcome: TestOutcome,
    /// Diagnostics emitted through the test context, in order.
    pub diagnostics: Vec<String>,
    /// Time spent in per-test hooks and the body.
    pub duration: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// Suites
// ─────────────────────────────────────────────────────────────────────────────

/// How a suite ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStatus {
    /// The body registered its tests and they were run.
    Completed,
    /// The suite carried a `skip` marker; its body never ran.
    Skipped(Option<String>),
    /// The body failed, so no test was run.
    Failed(String),
}

/// A once-per-suite or per-test hook that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookFailure {
    /// Kebab-case hook phase, such as `after-all`.
    pub phase: &'static str,
    /// Error message.
    pub message: String,
}

/// Report of one suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Registered suite name.
    pub name: String,
    /// How the suite ended.
    pub status: SuiteStatus,
    /// Test reports in execution order.
    pub tests: Vec<TestReport>,
    /// Failures of once-per-suite hooks.
    pub hook_failures: Vec<HookFailure>,
    /// Diagnostics emitted by once-per-suite hooks.
    pub diagnostics: Vec<String>,
    /// Wall time of the whole suite.
    pub duration: Duration,
}

impl SuiteReport {
    pub(crate) fn new(name: String, status: SuiteStatus) -> Self {
        Self {
            name,
            status,
            tests: Vec::new(),
            hook_failures: Vec::new(),
            diagnostics: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Returns the report of the named test.
    #[must_use]
    pub fn test(&self, name: &str) -> Option<&TestReport> {
        self.tests.iter().find(|test| test.name == name)
    }

    /// Returns whether the suite, its hooks and all its tests succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self.status, SuiteStatus::Failed(_))
            && self.hook_failures.is_empty()
            && !self.tests.iter().any(|test| test.outcome.is_failure())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RunReport
// ─────────────────────────────────────────────────────────────────────────────

/// Counts of test outcomes across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Passed tests.
    pub passed: usize,
    /// Failed or timed out tests.
    pub failed: usize,
    /// Skipped tests.
    pub skipped: usize,
    /// Tests run under a `todo` marker.
    pub todo: usize,
    /// Cancelled tests.
    pub cancelled: usize,
}

/// Report of every suite run by a [`LocalRunner`](crate::LocalRunner).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Suite reports in registration order.
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    /// Returns the report of the named suite.
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&SuiteReport> {
        self.suites.iter().find(|suite| suite.name == name)
    }

    /// Returns whether every suite succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.suites.iter().all(SuiteReport::is_success)
    }

    /// Counts test outcomes across all suites.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for test in self.suites.iter().flat_map(|suite| &suite.tests) {
            match test.outcome {
                TestOutcome::Passed => summary.passed += 1,
                TestOutcome::Failed(_) | TestOutcome::TimedOut(_) => summary.failed += 1,
                TestOutcome::Skipped(_) => summary.skipped += 1,
                TestOutcome::Todo { .. } => summary.todo += 1,
                TestOutcome::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(name: &str, outcome: TestOutcome) -> TestReport {
        TestReport {
            name: name.to_string(),
            outcome,
            diagnostics: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn todo_failures_do_not_fail_the_run() {
        let mut suite = SuiteReport::new("Suite".into(), SuiteStatus::Completed);
        suite.tests.push(test("a", TestOutcome::Passed));
        suite.tests.push(test(
            "b",
            TestOutcome::Todo {
                reason: None,
                passed: false,
            },
        ));
        let report = RunReport {
            suites: vec![suite],
        };

        assert!(report.is_success());
        let summary = report.summary();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.todo, 1);
    }

    #[test]
    fn after_all_failure_fails_the_suite() {
        let mut suite = SuiteReport::new("Suite".into(), SuiteStatus::Completed);
        suite.hook_failures.push(HookFailure {
            phase: "after-all",
            message: "cleanup failed".into(),
        });
        assert!(!suite.is_success());
    }

    #[test]
    fn serializes_outcomes_in_snake_case() {
        let report = RunReport {
            suites: vec![SuiteReport::new(
                "Skipped".into(),
                SuiteStatus::Skipped(Some("later".into())),
            )],
        };
        let json = report.to_json().unwrap();
        assert!(json.contains("\"skipped\": \"later\""));
    }
}
