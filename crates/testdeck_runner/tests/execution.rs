//! Execution semantics of the local runner.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use testdeck_runner::{LocalRunner, SuiteStatus, TestOutcome};
use testdeck_suite::prelude::*;

fn config() -> SuiteConfig {
    SuiteConfig::new(None)
}

// ─────────────────────────────────────────────────────────────────────────────
// Test outcomes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Outcomes;

#[fixture]
impl Outcomes {
    #[test_case]
    fn passes(&self) {}

    #[test_case]
    fn returns_error(&self) -> Result<(), String> {
        Err("expected failure".to_string())
    }

    #[test_case]
    fn panics(&self) {
        panic!("exploded");
    }

    #[test_case(timeout = 10)]
    async fn too_slow(&self) {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    #[test_skipped]
    fn skipped(&self) {
        unreachable!("skipped tests never run");
    }

    #[test_case(skip = "not on this platform")]
    fn skipped_with_reason(&self) {
        unreachable!("skipped tests never run");
    }

    #[test_todo]
    fn unfinished(&self) -> Result<(), String> {
        Err("not implemented".to_string())
    }
}

#[tokio::test]
async fn reports_each_outcome() {
    let mut runner = LocalRunner::new();
    Suite::<Outcomes>::new()
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    let suite = report.suite("Outcomes").unwrap();
    let outcome = |name: &str| suite.test(name).unwrap().outcome.clone();

    assert_eq!(outcome("passes"), TestOutcome::Passed);
    assert_eq!(
        outcome("returns_error"),
        TestOutcome::Failed("expected failure".to_string())
    );
    assert_eq!(
        outcome("panics"),
        TestOutcome::Failed("panicked: exploded".to_string())
    );
    assert_eq!(
        outcome("too_slow"),
        TestOutcome::TimedOut(Duration::from_millis(10))
    );
    assert_eq!(outcome("skipped"), TestOutcome::Skipped(None));
    assert_eq!(
        outcome("skipped_with_reason"),
        TestOutcome::Skipped(Some("not on this platform".to_string()))
    );
    assert_eq!(
        outcome("unfinished"),
        TestOutcome::Todo {
            reason: None,
            passed: false,
        }
    );

    assert!(!report.is_success());
    let summary = report.summary();
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.todo, 1);

    let json = report.to_json().unwrap();
    assert!(json.contains("\"name\": \"Outcomes\""));
}

// ─────────────────────────────────────────────────────────────────────────────
// Suite timeout
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SlowSuite;

#[fixture]
impl SlowSuite {
    #[test_case]
    async fn inherits_suite_timeout(&self) {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    #[test_case(timeout = 2000)]
    async fn own_timeout_wins(&self) {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
}

#[tokio::test]
async fn test_timeout_falls_back_to_suite_timeout() {
    let mut runner = LocalRunner::new();
    Suite::<SlowSuite>::new()
        .with_options(TestOptions::new().with_timeout(Duration::from_millis(15)))
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    let suite = report.suite("SlowSuite").unwrap();
    assert_eq!(
        suite.test("inherits_suite_timeout").unwrap().outcome,
        TestOutcome::TimedOut(Duration::from_millis(15))
    );
    assert_eq!(
        suite.test("own_timeout_wins").unwrap().outcome,
        TestOutcome::Passed
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Suite-level skip
// ─────────────────────────────────────────────────────────────────────────────

static SKIPPED_CONSTRUCTED: AtomicBool = AtomicBool::new(false);

struct NeverBuilt;

#[fixture]
impl NeverBuilt {
    #[constructor]
    fn new() -> Self {
        SKIPPED_CONSTRUCTED.store(true, Ordering::SeqCst);
        Self
    }

    #[test_case]
    fn would_pass(&self) {}
}

#[tokio::test]
async fn skipped_suite_never_runs_its_body() {
    let mut runner = LocalRunner::new();
    Suite::<NeverBuilt>::new()
        .with_options(TestOptions::new().with_skip("not today"))
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    let suite = report.suite("NeverBuilt").unwrap();
    assert_eq!(
        suite.status,
        SuiteStatus::Skipped(Some("not today".to_string()))
    );
    assert!(suite.tests.is_empty());
    assert!(!SKIPPED_CONSTRUCTED.load(Ordering::SeqCst));
    assert!(report.is_success());
}

// ─────────────────────────────────────────────────────────────────────────────
// Failing before-all
// ─────────────────────────────────────────────────────────────────────────────

static TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct BrokenSetup;

#[fixture]
impl BrokenSetup {
    #[before_all(diagnostic = "connecting")]
    fn connect(&mut self) -> Result<(), String> {
        Err("connection refused".to_string())
    }

    #[after_all]
    fn disconnect(&mut self) {
        TEARDOWNS.fetch_add(1, Ordering::SeqCst);
    }

    #[test_case]
    fn first(&self) {}

    #[test_case]
    fn second(&self) {}
}

#[tokio::test]
async fn failing_before_all_fails_every_test_but_runs_after_all() {
    let mut runner = LocalRunner::new();
    Suite::<BrokenSetup>::new()
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    let suite = report.suite("BrokenSetup").unwrap();

    let expected = TestOutcome::Failed("before-all hook failed: connection refused".to_string());
    assert_eq!(suite.test("first").unwrap().outcome, expected);
    assert_eq!(suite.test("second").unwrap().outcome, expected);
    assert_eq!(suite.hook_failures.len(), 1);
    assert_eq!(suite.hook_failures[0].phase, "before-all");
    assert_eq!(suite.diagnostics, ["connecting"]);
    assert_eq!(TEARDOWNS.load(Ordering::SeqCst), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Only mode
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Focused;

#[fixture]
impl Focused {
    #[test_only]
    fn focused(&self) {}

    #[test_case]
    fn unfocused(&self) {}
}

#[tokio::test]
async fn only_mode_skips_unmarked_tests() {
    let mut runner = LocalRunner::new().with_only(true);
    Suite::<Focused>::new()
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    let suite = report.suite("Focused").unwrap();
    assert_eq!(suite.test("focused").unwrap().outcome, TestOutcome::Passed);
    assert!(matches!(
        suite.test("unfocused").unwrap().outcome,
        TestOutcome::Skipped(Some(_))
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Abort signal
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Abortable;

#[fixture]
impl Abortable {
    #[test_case]
    fn cancelled(&self) {}
}

#[tokio::test]
async fn aborted_signal_cancels_tests() {
    let signal = AbortSignal::new();
    signal.abort();

    let mut runner = LocalRunner::new();
    Suite::<Abortable>::new()
        .with_options(TestOptions::new().with_signal(signal))
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    let suite = report.suite("Abortable").unwrap();
    assert_eq!(
        suite.test("cancelled").unwrap().outcome,
        TestOutcome::Cancelled
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Failing suite body
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default, Parameterized)]
struct Typed {
    #[param]
    count: u32,
}

#[fixture]
impl Typed {
    #[test_case]
    fn counts(&self) {
        assert!(self.count < 10);
    }
}

#[tokio::test]
async fn undeserializable_value_fails_the_suite_body() {
    let mut runner = LocalRunner::new();
    ParameterizedSuite::<Typed>::new()
        .properties(["count"])
        .run([json!(3)])
        .run([json!("three")])
        .with_config(config())
        .register(&mut runner)
        .unwrap();

    let report = runner.run().await;
    assert_eq!(
        report.suite("Typed #0").unwrap().status,
        SuiteStatus::Completed
    );

    let failed = report.suite("Typed #1").unwrap();
    assert!(matches!(&failed.status, SuiteStatus::Failed(message) if message.contains("count")));
    assert!(failed.tests.is_empty());
    assert!(!report.is_success());
}
