//! Sequential in-process execution of registered suites.
//!
//! Suites run one after another in registration order, and so do the tests
//! of a suite. Hooks registered before tests run in registration order;
//! hooks registered after tests run in reverse registration order, so the
//! innermost fixture tears down first.

use core::any::Any;
use core::time::Duration;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use testdeck_suite::{
    AbortSignal, BoxFuture, Marker, SuiteBody, SuiteContext, TestContext, TestOptions, TestResult,
    TestRuntime,
};

use crate::report::{HookFailure, RunReport, SuiteReport, SuiteStatus, TestOutcome, TestReport};
use crate::scope::{CollectedSuite, DiagnosticLog, Hook, RegisteredTest};

/// A suite waiting for [`LocalRunner::run`].
struct PendingSuite {
    name: String,
    options: TestOptions,
    body: Box<dyn SuiteBody>,
}

// ─────────────────────────────────────────────────────────────────────────────
// LocalRunner
// ─────────────────────────────────────────────────────────────────────────────

/// A [`TestRuntime`] that runs suites in the current task.
///
/// # Example
///
/// ```
/// use testdeck_runner::LocalRunner;
/// use testdeck_suite::prelude::*;
///
/// #[derive(Default)]
/// struct Smoke;
///
/// #[fixture]
/// impl Smoke {
///     #[test_case]
///     fn passes(&self) {}
/// }
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let mut runner = LocalRunner::new();
/// Suite::<Smoke>::new().register(&mut runner).unwrap();
///
/// let report = runner.run().await;
/// assert!(report.is_success());
/// assert_eq!(report.summary().passed, 1);
/// # });
/// ```
#[derive(Default)]
pub struct LocalRunner {
    suites: Vec<PendingSuite>,
    only: bool,
}

impl LocalRunner {
    /// Creates a runner with no suites.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables "only" mode: tests not carrying the `only` flag, directly or
    /// through their suite, are skipped.
    #[must_use]
    pub fn with_only(mut self, only: bool) -> Self {
        self.only = only;
        self
    }

    /// Returns the number of registered suites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// Returns whether no suite is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Returns the registered suite names, in registration order.
    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.suites.iter().map(|suite| suite.name.as_str())
    }

    /// Runs every registered suite and collects their reports.
    pub async fn run(self) -> RunReport {
        let Self { suites, only } = self;
        let mut report = RunReport::default();

        for suite in suites {
            report.suites.push(run_suite(suite, only).await);
        }

        let summary = report.summary();
        tracing::info!(
            suites = report.suites.len(),
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            todo = summary.todo,
            cancelled = summary.cancelled,
            "run finished"
        );
        report
    }
}

impl TestRuntime for LocalRunner {
    fn register_suite(&mut self, name: String, options: TestOptions, body: Box<dyn SuiteBody>) {
        tracing::debug!(suite = %name, "suite registered");
        self.suites.push(PendingSuite {
            name,
            options,
            body,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Suites
// ─────────────────────────────────────────────────────────────────────────────

async fn run_suite(suite: PendingSuite, only: bool) -> SuiteReport {
    let PendingSuite {
        name,
        options,
        body,
    } = suite;
    let started = Instant::now();

    if options.is_skipped() {
        tracing::info!(suite = %name, "suite skipped");
        return SuiteReport::new(name, SuiteStatus::Skipped(reason_of(options.skip.as_ref())));
    }

    tracing::info!(suite = %name, "running suite");
    let mut collected = CollectedSuite::default();
    let registered = AssertUnwindSafe(body.run(SuiteContext::new(name.as_str()), &mut collected))
        .catch_unwind()
        .await;

    let failure = match registered {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    };
    if let Some(message) = failure {
        tracing::warn!(suite = %name, error = %message, "suite body failed");
        let mut report = SuiteReport::new(name, SuiteStatus::Failed(message));
        report.duration = started.elapsed();
        return report;
    }

    let mut report = SuiteReport::new(name, SuiteStatus::Completed);
    let suite_log = Arc::new(DiagnosticLog::default());
    let suite_context = TestContext::new(report.name.as_str()).with_sink(suite_log.clone());

    let mut setup_failure = None;
    for hook in &collected.before_all {
        if let Err(interrupted) = run_hook(hook, suite_context.clone()).await {
            let message = interrupted.message();
            tracing::warn!(suite = %report.name, error = %message, "before-all hook failed");
            report.hook_failures.push(HookFailure {
                phase: "before-all",
                message: message.clone(),
            });
            setup_failure = Some(message);
            break;
        }
    }

    for test in &collected.tests {
        let test_report =
            run_test(&collected, test, &options, only, setup_failure.as_deref()).await;
        tracing::debug!(
            suite = %report.name,
            test = %test_report.name,
            outcome = ?test_report.outcome,
            "test finished"
        );
        report.tests.push(test_report);
    }

    for hook in collected.after_all.iter().rev() {
        if let Err(interrupted) = run_hook(hook, suite_context.clone()).await {
            let message = interrupted.message();
            tracing::warn!(suite = %report.name, error = %message, "after-all hook failed");
            report.hook_failures.push(HookFailure {
                phase: "after-all",
                message,
            });
        }
    }

    report.diagnostics = suite_log.take();
    report.duration = started.elapsed();
    report
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

async fn run_test(
    collected: &CollectedSuite,
    test: &RegisteredTest,
    suite_options: &TestOptions,
    only: bool,
    setup_failure: Option<&str>,
) -> TestReport {
    let started = Instant::now();
    let log = Arc::new(DiagnosticLog::default());
    let signal = test
        .options
        .signal
        .clone()
        .or_else(|| suite_options.signal.clone());

    let outcome = match outcome_without_running(test, suite_options, only, signal.as_ref()) {
        Some(outcome) => outcome,
        None => match setup_failure {
            Some(message) => TestOutcome::Failed(format!("before-all hook failed: {message}")),
            None => {
                let context = TestContext::new(test.name.as_str()).with_sink(log.clone());
                let timeout = test.options.timeout.or(suite_options.timeout);
                execute(collected, test, context, timeout, signal).await
            }
        },
    };

    let todo = set_marker(test.options.todo.as_ref()).or(set_marker(suite_options.todo.as_ref()));
    let outcome = match (todo, outcome) {
        (Some(marker), outcome @ (TestOutcome::Passed | TestOutcome::Failed(_) | TestOutcome::TimedOut(_))) => {
            TestOutcome::Todo {
                reason: marker.reason().map(str::to_string),
                passed: outcome == TestOutcome::Passed,
            }
        }
        (_, outcome) => outcome,
    };

    TestReport {
        name: test.name.clone(),
        outcome,
        diagnostics: log.take(),
        duration: started.elapsed(),
    }
}

/// Decides outcomes that do not require running the test.
fn outcome_without_running(
    test: &RegisteredTest,
    suite_options: &TestOptions,
    only: bool,
    signal: Option<&AbortSignal>,
) -> Option<TestOutcome> {
    if test.options.is_skipped() {
        return Some(TestOutcome::Skipped(reason_of(test.options.skip.as_ref())));
    }
    if only && !test.options.only.unwrap_or(false) && !suite_options.only.unwrap_or(false) {
        return Some(TestOutcome::Skipped(Some("not marked only".to_string())));
    }
    if signal.is_some_and(AbortSignal::is_aborted) {
        return Some(TestOutcome::Cancelled);
    }
    None
}

/// Runs per-test hooks around the body.
async fn execute(
    collected: &CollectedSuite,
    test: &RegisteredTest,
    context: TestContext,
    timeout: Option<Duration>,
    signal: Option<AbortSignal>,
) -> TestOutcome {
    let mut outcome = TestOutcome::Passed;

    for hook in &collected.before_each {
        if let Err(interrupted) = run_hook(hook, context.clone()).await {
            outcome = TestOutcome::Failed(format!(
                "before-each hook failed: {}",
                interrupted.message()
            ));
            break;
        }
    }

    if outcome == TestOutcome::Passed
        && let Err(interrupted) = guarded((test.executable)(context.clone()), timeout, signal).await
    {
        outcome = interrupted.into_outcome();
    }

    for hook in collected.after_each.iter().rev() {
        if let Err(interrupted) = run_hook(hook, context.clone()).await
            && outcome == TestOutcome::Passed
        {
            outcome = TestOutcome::Failed(format!(
                "after-each hook failed: {}",
                interrupted.message()
            ));
        }
    }

    outcome
}

// ─────────────────────────────────────────────────────────────────────────────
// Guarded execution
// ─────────────────────────────────────────────────────────────────────────────

/// Why a hook or test body did not complete successfully.
#[derive(Debug)]
enum Interrupted {
    Failed(String),
    TimedOut(Duration),
    Cancelled,
}

impl Interrupted {
    fn message(&self) -> String {
        match self {
            Self::Failed(message) => message.clone(),
            Self::TimedOut(limit) => format!("timed out after {limit:?}"),
            Self::Cancelled => "cancelled".to_string(),
        }
    }

    fn into_outcome(self) -> TestOutcome {
        match self {
            Self::Failed(message) => TestOutcome::Failed(message),
            Self::TimedOut(limit) => TestOutcome::TimedOut(limit),
            Self::Cancelled => TestOutcome::Cancelled,
        }
    }
}

async fn run_hook(hook: &Hook, context: TestContext) -> Result<(), Interrupted> {
    guarded(
        (hook.executable)(context),
        hook.options.timeout,
        hook.options.signal.clone(),
    )
    .await
}

/// Awaits `future`, bounded by `timeout`, raced against `signal`, with panics caught.
async fn guarded(
    future: BoxFuture<'static, TestResult>,
    timeout: Option<Duration>,
    signal: Option<AbortSignal>,
) -> Result<(), Interrupted> {
    let caught = AssertUnwindSafe(future).catch_unwind();
    let bounded = async move {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, caught)
                .await
                .map_err(|_| Interrupted::TimedOut(limit)),
            None => Ok(caught.await),
        }
    };

    let completed = match signal {
        Some(signal) => tokio::select! {
            completed = bounded => completed,
            () = signal.aborted() => Err(Interrupted::Cancelled),
        },
        None => bounded.await,
    }?;

    match completed {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Interrupted::Failed(err.to_string())),
        Err(payload) => Err(Interrupted::Failed(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

fn set_marker(marker: Option<&Marker>) -> Option<&Marker> {
    marker.filter(|marker| marker.is_set())
}

fn reason_of(marker: Option<&Marker>) -> Option<String> {
    marker.and_then(Marker::reason).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guarded_reports_timeouts() {
        let slow: BoxFuture<'static, TestResult> = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
        .boxed();

        let result = guarded(slow, Some(Duration::from_millis(10)), None).await;
        assert!(matches!(result, Err(Interrupted::TimedOut(_))));
    }

    async fn explode() -> TestResult {
        panic!("boom")
    }

    #[tokio::test]
    async fn guarded_catches_panics() {
        let result = guarded(explode().boxed(), None, None).await;
        match result {
            Err(Interrupted::Failed(message)) => assert_eq!(message, "panicked: boom"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn guarded_stops_on_abort() {
        let signal = AbortSignal::new();
        let pending: BoxFuture<'static, TestResult> = futures::future::pending().boxed();

        let aborter = signal.clone();
        let (result, ()) = tokio::join!(guarded(pending, None, Some(signal)), async move {
            tokio::task::yield_now().await;
            aborter.abort();
        });
        assert!(matches!(result, Err(Interrupted::Cancelled)));
    }

    #[test]
    fn unset_markers_are_ignored() {
        let unset = Marker::Flag(false);
        assert!(set_marker(Some(&unset)).is_none());
        assert_eq!(reason_of(Some(&Marker::from("flaky"))), Some("flaky".to_string()));
    }
}
