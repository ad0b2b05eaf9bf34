//! Recording runtime shared by the registration tests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use testdeck_suite::{
    DiagnosticSink, EachPhase, Executable, HookOptions, OncePhase, SuiteBody, SuiteContext,
    SuiteError, SuiteScope, TestContext, TestOptions, TestRuntime,
};

/// A suite handed to [`RecordingRuntime`].
pub struct RecordedSuite {
    pub name: String,
    pub options: TestOptions,
    body: Option<Box<dyn SuiteBody>>,
}

/// Runtime that records registrations and runs bodies on demand.
#[derive(Default)]
pub struct RecordingRuntime {
    pub suites: Vec<RecordedSuite>,
}

impl TestRuntime for RecordingRuntime {
    fn register_suite(&mut self, name: String, options: TestOptions, body: Box<dyn SuiteBody>) {
        self.suites.push(RecordedSuite {
            name,
            options,
            body: Some(body),
        });
    }
}

impl RecordingRuntime {
    pub fn names(&self) -> Vec<&str> {
        self.suites.iter().map(|suite| suite.name.as_str()).collect()
    }

    /// Runs the body of the suite at `index`, returning its result and registrations.
    pub async fn run_body(&mut self, index: usize) -> (Result<(), SuiteError>, Vec<Registered>) {
        let suite = &mut self.suites[index];
        let body = suite.body.take().expect("suite body runs once");
        let mut scope = Scope::default();
        let result = body
            .run(SuiteContext::new(suite.name.clone()), &mut scope)
            .await;
        (result, scope.entries)
    }
}

/// One registration issued by a suite body.
pub struct Registered {
    /// `before-all`, `before-each`, `after-each`, `after-all` or `test:<name>`.
    pub label: String,
    pub diagnostic: Option<String>,
    pub timeout: Option<Duration>,
    pub executable: Executable,
}

impl Registered {
    /// Invokes the executable, returning the error message if it failed and
    /// the diagnostics it emitted.
    pub async fn invoke(&self, name: &str) -> (Option<String>, Vec<String>) {
        let sink = Arc::new(Diagnostics::default());
        let context = TestContext::new(name).with_sink(sink.clone());
        let error = (self.executable)(context)
            .await
            .err()
            .map(|err| err.to_string());
        (error, sink.0.lock().clone())
    }
}

#[derive(Default)]
struct Scope {
    entries: Vec<Registered>,
}

impl Scope {
    fn hook(&mut self, label: &str, executable: Executable, options: HookOptions) {
        self.entries.push(Registered {
            label: label.to_string(),
            diagnostic: options.diagnostic,
            timeout: options.timeout,
            executable,
        });
    }
}

impl SuiteScope for Scope {
    fn register_hook_once(&mut self, phase: OncePhase, hook: Executable, options: HookOptions) {
        let label = match phase {
            OncePhase::Before => "before-all",
            OncePhase::After => "after-all",
        };
        self.hook(label, hook, options);
    }

    fn register_hook_per_test(&mut self, phase: EachPhase, hook: Executable, options: HookOptions) {
        let label = match phase {
            EachPhase::Before => "before-each",
            EachPhase::After => "after-each",
        };
        self.hook(label, hook, options);
    }

    fn register_test(&mut self, name: &str, options: TestOptions, test: Executable) {
        self.entries.push(Registered {
            label: format!("test:{name}"),
            diagnostic: options.diagnostic,
            timeout: options.timeout,
            executable: test,
        });
    }
}

#[derive(Default)]
struct Diagnostics(Mutex<Vec<String>>);

impl DiagnosticSink for Diagnostics {
    fn diagnostic(&self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}
