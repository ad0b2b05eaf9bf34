//! Collection of the hooks and tests a suite body registers.

use parking_lot::Mutex;
use testdeck_suite::{
    DiagnosticSink, EachPhase, Executable, HookOptions, OncePhase, SuiteScope, TestOptions,
};

/// A registered lifecycle hook.
pub(crate) struct Hook {
    pub(crate) executable: Executable,
    pub(crate) options: HookOptions,
}

/// A registered test case.
pub(crate) struct RegisteredTest {
    pub(crate) name: String,
    pub(crate) options: TestOptions,
    pub(crate) executable: Executable,
}

/// Everything one suite body registered, in registration order.
#[derive(Default)]
pub(crate) struct CollectedSuite {
    pub(crate) before_all: Vec<Hook>,
    pub(crate) before_each: Vec<Hook>,
    pub(crate) after_each: Vec<Hook>,
    pub(crate) after_all: Vec<Hook>,
    pub(crate) tests: Vec<RegisteredTest>,
}

impl SuiteScope for CollectedSuite {
    fn register_hook_once(&mut self, phase: OncePhase, hook: Executable, options: HookOptions) {
        let hook = Hook {
            executable: hook,
            options,
        };
        match phase {
            OncePhase::Before => self.before_all.push(hook),
            OncePhase::After => self.after_all.push(hook),
        }
    }

    fn register_hook_per_test(&mut self, phase: EachPhase, hook: Executable, options: HookOptions) {
        let hook = Hook {
            executable: hook,
            options,
        };
        match phase {
            EachPhase::Before => self.before_each.push(hook),
            EachPhase::After => self.after_each.push(hook),
        }
    }

    fn register_test(&mut self, name: &str, options: TestOptions, test: Executable) {
        self.tests.push(RegisteredTest {
            name: name.to_string(),
            options,
            executable: test,
        });
    }
}

/// Diagnostics emitted while one test (or one suite's once-hooks) runs.
#[derive(Default)]
pub(crate) struct DiagnosticLog {
    messages: Mutex<Vec<String>>,
}

impl DiagnosticLog {
    /// Drains the collected messages.
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn diagnostic(&self, message: &str) {
        tracing::debug!(message, "diagnostic");
        self.messages.lock().push(message.to_string());
    }
}
