//! Options attached to suites, hooks and test cases.
//!
//! [`TestOptions`] mirrors the option set understood by a test runtime.
//! Every field is optional: an unset field means "inherit from the enclosing
//! level", which is what makes the field-wise [`TestOptions::overlay`] merge
//! meaningful.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use tokio::sync::Notify;

// ─────────────────────────────────────────────────────────────────────────────
// Marker
// ─────────────────────────────────────────────────────────────────────────────

/// Value of a `skip` or `todo` option: a plain flag or a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Explicitly enabled or disabled.
    Flag(bool),
    /// Enabled, with a human-readable reason.
    Reason(String),
}

impl Marker {
    /// Returns whether the marker is in effect.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Flag(enabled) => *enabled,
            Self::Reason(_) => true,
        }
    }

    /// Returns the reason, if one was given.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Flag(_) => None,
            Self::Reason(reason) => Some(reason),
        }
    }
}

impl From<bool> for Marker {
    fn from(enabled: bool) -> Self {
        Self::Flag(enabled)
    }
}

impl From<&str> for Marker {
    fn from(reason: &str) -> Self {
        Self::Reason(reason.to_owned())
    }
}

impl From<String> for Marker {
    fn from(reason: String) -> Self {
        Self::Reason(reason)
    }
}

/// Value of the `concurrency` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Run concurrently with the runtime's default limit, or sequentially.
    Enabled(bool),
    /// Run at most this many tests at once.
    Limit(usize),
}

// ─────────────────────────────────────────────────────────────────────────────
// AbortSignal
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SignalState {
    aborted: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation flag forwarded to the runtime.
///
/// Clones share the same state; two signals compare equal only if they are
/// clones of each other.
#[derive(Clone, Default)]
pub struct AbortSignal {
    state: Arc<SignalState>,
}

impl AbortSignal {
    /// Creates a signal that has not been aborted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aborts the signal, waking every task waiting on [`aborted`](Self::aborted).
    pub fn abort(&self) {
        if !self.state.aborted.swap(true, Ordering::SeqCst) {
            self.state.notify.notify_waiters();
        }
    }

    /// Returns whether [`abort`](Self::abort) has been called.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::SeqCst)
    }

    /// Completes once the signal is aborted.
    pub async fn aborted(&self) {
        loop {
            // Register interest before checking the flag so a concurrent
            // abort cannot slip between the check and the wait.
            let notified = self.state.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

impl PartialEq for AbortSignal {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TestOptions
// ─────────────────────────────────────────────────────────────────────────────

/// Options for a suite or a test case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestOptions {
    /// Diagnostic emitted before the test runs and appended to suite names.
    pub diagnostic: Option<String>,
    /// Maximum run time.
    pub timeout: Option<Duration>,
    /// Skip the test or suite.
    pub skip: Option<Marker>,
    /// Mark the test or suite as not yet expected to pass.
    pub todo: Option<Marker>,
    /// Run only tests carrying this flag when the runtime is in "only" mode.
    pub only: Option<bool>,
    /// Concurrency hint for the runtime.
    pub concurrency: Option<Concurrency>,
    /// Abort signal forwarded to the runtime.
    pub signal: Option<AbortSignal>,
    /// Number of assertions the test plans to run.
    pub plan: Option<u32>,
}

impl TestOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the diagnostic string.
    #[must_use]
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `skip` marker.
    #[must_use]
    pub fn with_skip(mut self, skip: impl Into<Marker>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    /// Sets the `todo` marker.
    #[must_use]
    pub fn with_todo(mut self, todo: impl Into<Marker>) -> Self {
        self.todo = Some(todo.into());
        self
    }

    /// Sets the `only` flag.
    #[must_use]
    pub fn with_only(mut self, only: bool) -> Self {
        self.only = Some(only);
        self
    }

    /// Sets the concurrency hint.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Sets the abort signal.
    #[must_use]
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Sets the planned assertion count.
    #[must_use]
    pub fn with_plan(mut self, plan: u32) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Returns a copy of `self` with every field set in `over` replacing ours.
    #[must_use]
    pub fn overlay(&self, over: &TestOptions) -> TestOptions {
        TestOptions {
            diagnostic: over.diagnostic.clone().or_else(|| self.diagnostic.clone()),
            timeout: over.timeout.or(self.timeout),
            skip: over.skip.clone().or_else(|| self.skip.clone()),
            todo: over.todo.clone().or_else(|| self.todo.clone()),
            only: over.only.or(self.only),
            concurrency: over.concurrency.or(self.concurrency),
            signal: over.signal.clone().or_else(|| self.signal.clone()),
            plan: over.plan.or(self.plan),
        }
    }

    /// Returns whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns whether the `skip` marker is in effect.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skip.as_ref().is_some_and(Marker::is_set)
    }

    /// Returns whether the `todo` marker is in effect.
    #[must_use]
    pub fn is_todo(&self) -> bool {
        self.todo.as_ref().is_some_and(Marker::is_set)
    }
}

/// Options for a lifecycle hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookOptions {
    /// Diagnostic emitted before the hook runs.
    pub diagnostic: Option<String>,
    /// Abort signal forwarded to the runtime.
    pub signal: Option<AbortSignal>,
    /// Maximum run time.
    pub timeout: Option<Duration>,
}

impl From<&TestOptions> for HookOptions {
    fn from(options: &TestOptions) -> Self {
        Self {
            diagnostic: options.diagnostic.clone(),
            signal: options.signal.clone(),
            timeout: options.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_prefers_set_fields() {
        let base = TestOptions::new()
            .with_diagnostic("base")
            .with_todo(true)
            .with_timeout(Duration::from_millis(10));
        let over = TestOptions::new().with_diagnostic("over");

        let merged = base.overlay(&over);
        assert_eq!(merged.diagnostic.as_deref(), Some("over"));
        assert_eq!(merged.todo, Some(Marker::Flag(true)));
        assert_eq!(merged.timeout, Some(Duration::from_millis(10)));
    }

    #[test]
    fn overlay_with_empty_is_identity() {
        let base = TestOptions::new().with_skip("flaky").with_plan(3);
        assert_eq!(base.overlay(&TestOptions::new()), base);
        assert_eq!(TestOptions::new().overlay(&base), base);
    }

    #[test]
    fn marker_reason_implies_set() {
        assert!(Marker::from("later").is_set());
        assert!(!Marker::from(false).is_set());
        assert_eq!(Marker::from("later").reason(), Some("later"));
        assert!(TestOptions::new().with_skip("why").is_skipped());
        assert!(!TestOptions::new().with_todo(false).is_todo());
    }

    #[test]
    fn hook_options_keep_hook_fields_only() {
        let signal = AbortSignal::new();
        let options = TestOptions::new()
            .with_diagnostic("d")
            .with_timeout(Duration::from_secs(1))
            .with_signal(signal.clone())
            .with_todo(true);

        let hook = HookOptions::from(&options);
        assert_eq!(hook.diagnostic.as_deref(), Some("d"));
        assert_eq!(hook.timeout, Some(Duration::from_secs(1)));
        assert_eq!(hook.signal, Some(signal));
    }

    #[test]
    fn signals_compare_by_identity() {
        let a = AbortSignal::new();
        let b = AbortSignal::new();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn aborted_completes_after_abort() {
        let signal = AbortSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.aborted().await });

        tokio::task::yield_now().await;
        signal.abort();
        handle.await.expect("waiter should finish");
        assert!(signal.is_aborted());
    }
}
