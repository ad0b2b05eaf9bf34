//! Declarative test suites built from annotated fixture types.
//!
//! A fixture is a plain type whose methods are marked as hooks or test cases
//! with `#[fixture]`. Registering the fixture with a [`TestRuntime`] yields
//! one suite (or one per parameterized run); when the runtime runs the
//! suite body, a fresh instance is constructed and every declared method is
//! registered with the matching runtime call.
//!
//! # Quick Start
//!
//! ```
//! use testdeck_suite::prelude::*;
//!
//! #[derive(Default)]
//! struct Arithmetic {
//!     operands: Vec<i64>,
//! }
//!
//! #[fixture]
//! impl Arithmetic {
//!     #[before_each]
//!     fn load(&mut self) {
//!         self.operands = vec![2, 3];
//!     }
//!
//!     #[test_case]
//!     fn adds(&mut self, context: &TestContext) -> Result<(), String> {
//!         context.diagnostic("adding");
//!         (self.operands.iter().sum::<i64>() == 5)
//!             .then_some(())
//!             .ok_or_else(|| "bad sum".to_string())
//!     }
//!
//!     #[test_todo]
//!     async fn divides(&mut self) {}
//! }
//!
//! let suite = Suite::<Arithmetic>::new().compose().unwrap();
//! assert_eq!(suite.name(), "Arithmetic");
//! ```
//!
//! # Architecture
//!
//! - [`declare`] — per-instance ordered registry of declared methods
//! - [`resolve`] — option precedence and static defaults
//! - [`compose`] — [`Suite`] and [`ParameterizedSuite`] registrations
//! - [`wiring`] — instance construction and runtime registration
//! - [`runtime`] — traits a test runtime implements

// Self-reference so `#[fixture]` generated code can use `testdeck_suite::` paths within this crate.
extern crate self as testdeck_suite;

pub mod compose;
pub mod config;
pub mod context;
pub mod declare;
pub mod error;
pub mod fixture;
pub mod options;
pub mod resolve;
pub mod runtime;
pub mod wiring;

pub use compose::{ComposedSuite, ParameterizedSuite, RunValues, Suite};
pub use config::{SuiteConfig, TIMEOUT_ENV};
pub use context::{DiagnosticSink, SuiteContext, TestContext};
pub use declare::{Declaration, DeclarationKind, Declarations, MethodId};
pub use error::{ParamError, SuiteError};
pub use fixture::{Fixture, Parameterized};
pub use options::{AbortSignal, Concurrency, HookOptions, Marker, TestOptions};
pub use resolve::{OptionResolver, StaticDefaults, static_defaults_of};
pub use runtime::{
    BoxError, BoxFuture, EachPhase, Executable, IntoTestResult, OncePhase, SuiteBody, SuiteScope,
    TestResult, TestRuntime,
};
pub use wiring::Instance;

// Re-export proc macros.
pub use testdeck_suite_macros::{Parameterized, fixture};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::compose::{ParameterizedSuite, RunValues, Suite};
    pub use crate::config::SuiteConfig;
    pub use crate::context::{SuiteContext, TestContext};
    pub use crate::declare::Declarations;
    pub use crate::error::SuiteError;
    pub use crate::fixture::{Fixture, Parameterized};
    pub use crate::options::{AbortSignal, HookOptions, Marker, TestOptions};
    pub use crate::runtime::{TestResult, TestRuntime};
    pub use testdeck_suite_macros::{Parameterized, fixture};
}
