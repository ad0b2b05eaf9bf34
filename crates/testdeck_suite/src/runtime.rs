//! Boundary with the test runtime that schedules and executes suites.
//!
//! The engine only *registers* suites, hooks and tests through these traits.
//! Scheduling, timeout enforcement and skip/todo/only semantics belong to the
//! implementor.

use std::sync::Arc;

pub use futures::future::BoxFuture;

use crate::context::{SuiteContext, TestContext};
use crate::error::SuiteError;
use crate::options::{HookOptions, TestOptions};

/// Error type returned by failing hooks and test cases.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Outcome of one hook or test case invocation.
pub type TestResult = Result<(), BoxError>;

/// A hook or test case bound to its fixture instance.
pub type Executable = Arc<dyn Fn(TestContext) -> BoxFuture<'static, TestResult> + Send + Sync>;

/// Conversion of annotated method return values into a [`TestResult`].
pub trait IntoTestResult {
    /// Performs the conversion.
    fn into_test_result(self) -> TestResult;
}

impl IntoTestResult for () {
    fn into_test_result(self) -> TestResult {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoTestResult for Result<(), E> {
    fn into_test_result(self) -> TestResult {
        self.map_err(Into::into)
    }
}

/// Phase of a hook that runs once per suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OncePhase {
    /// Before the first test.
    Before,
    /// After the last test.
    After,
}

/// Phase of a hook that runs around every test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EachPhase {
    /// Before each test.
    Before,
    /// After each test.
    After,
}

/// Registration surface available while a suite body runs.
pub trait SuiteScope: Send {
    /// Registers a hook running once before or after all tests of the suite.
    fn register_hook_once(&mut self, phase: OncePhase, hook: Executable, options: HookOptions);

    /// Registers a hook running before or after every test of the suite.
    fn register_hook_per_test(&mut self, phase: EachPhase, hook: Executable, options: HookOptions);

    /// Registers a test case.
    fn register_test(&mut self, name: &str, options: TestOptions, test: Executable);
}

/// Deferred body of a registered suite.
///
/// The runtime calls [`run`](Self::run) exactly once, when it is ready to
/// collect the suite's hooks and tests.
pub trait SuiteBody: Send {
    /// Runs the body, registering hooks and tests on `scope`.
    ///
    /// # Errors
    ///
    /// Returns a [`SuiteError`] if the suite is misconfigured; in that case
    /// nothing has been registered on `scope`.
    fn run<'s>(
        self: Box<Self>,
        context: SuiteContext,
        scope: &'s mut dyn SuiteScope,
    ) -> BoxFuture<'s, Result<(), SuiteError>>;
}

/// A test runtime accepting suite registrations.
pub trait TestRuntime {
    /// Registers a suite whose body the runtime will run later.
    fn register_suite(&mut self, name: String, options: TestOptions, body: Box<dyn SuiteBody>);
}
