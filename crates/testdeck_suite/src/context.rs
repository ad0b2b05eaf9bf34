//! Contexts handed to fixtures, hooks and test cases by the runtime.

use core::fmt;
use std::sync::Arc;

/// Receives diagnostics emitted through a [`TestContext`].
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic message.
    fn diagnostic(&self, message: &str);
}

/// Suite-scoped context passed to [`Fixture::construct`](crate::Fixture::construct).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteContext {
    name: String,
}

impl SuiteContext {
    /// Creates a context for the suite with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the registered suite name, including any diagnostic suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Test-scoped context passed to hooks and test cases.
///
/// For once-per-suite hooks the name is the suite name; for per-test hooks
/// and test cases it is the test name.
#[derive(Clone)]
pub struct TestContext {
    name: String,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl TestContext {
    /// Creates a context without a diagnostic channel.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: None,
        }
    }

    /// Attaches the runtime's diagnostic channel.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the name of the running test or suite.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emits a diagnostic through the runtime's reporting channel.
    ///
    /// Does nothing if the runtime provided no channel.
    pub fn diagnostic(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink.diagnostic(message);
        }
    }
}

impl fmt::Debug for TestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContext")
            .field("name", &self.name)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
