//! In-process runtime for testdeck suites.
//!
//! [`LocalRunner`] implements [`TestRuntime`](testdeck_suite::TestRuntime):
//! suites registered on it are held until [`LocalRunner::run`], which runs
//! each suite body, executes the hooks and tests it registered, and returns
//! a serializable [`RunReport`].
//!
//! # Execution Semantics
//!
//! - A suite carrying `skip` is reported skipped without running its body.
//! - A body that fails or panics fails the suite; none of its tests run.
//! - A failing before-all hook fails every test; after-all hooks still run.
//! - Tests carrying `skip` are skipped, as are tests without `only` when the
//!   runner is in "only" mode.
//! - A test's timeout is its own, else its suite's.
//! - Tests under `todo` (their own or their suite's) run, but never count
//!   as failures.
//! - Diagnostics are collected per test; those emitted by once-per-suite
//!   hooks are collected on the suite.
//!
//! # Architecture
//!
//! - [`runner`] — registration and sequential execution
//! - [`report`] — suite and test outcomes
//! - [`logging`] — `tracing-subscriber` setup

pub mod logging;
pub mod report;
pub mod runner;
mod scope;

pub use logging::{LogConfig, LogFormat};
pub use report::{
    HookFailure, RunReport, Summary, SuiteReport, SuiteStatus, TestOutcome, TestReport,
};
pub use runner::LocalRunner;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat};
    pub use crate::report::{RunReport, SuiteReport, SuiteStatus, TestOutcome, TestReport};
    pub use crate::runner::LocalRunner;
}
