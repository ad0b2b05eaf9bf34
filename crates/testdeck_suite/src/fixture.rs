//! Traits implemented by fixture types.
//!
//! Both are normally generated: [`Fixture`] by `#[fixture]` on the impl block
//! holding the annotated methods, [`Parameterized`] by
//! `#[derive(Parameterized)]` on the struct.

use serde_json::Value;

use crate::context::SuiteContext;
use crate::declare::Declarations;
use crate::error::{ParamError, SuiteError};
use crate::options::TestOptions;

/// A type whose annotated methods form a test suite.
pub trait Fixture: Send + Sized + 'static {
    /// Name of the fixture, used as the suite name.
    const NAME: &'static str;

    /// Constructs the instance backing one suite run.
    fn construct(context: &SuiteContext) -> Self;

    /// Declares the fixture's hooks and test cases, inherited ones first.
    ///
    /// # Errors
    ///
    /// Returns a [`SuiteError`] if a method is declared twice or a base is
    /// imported after own declarations.
    fn declare(declarations: &mut Declarations<Self>) -> Result<(), SuiteError>;

    /// Static default options declared by this fixture for its descendants.
    ///
    /// Only base fixtures may return `Some`; registering a fixture that does
    /// is a configuration error.
    fn suite_options() -> Option<TestOptions> {
        None
    }

    /// Static default options declared by this fixture's ancestors.
    fn inherited_options() -> Option<TestOptions> {
        None
    }
}

/// A fixture with named properties assigned per parameterized run.
pub trait Parameterized: Fixture {
    /// Names of the assignable properties, in declaration order.
    const PROPERTIES: &'static [&'static str];

    /// Overwrites `property` with `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if the property is unknown or the value does
    /// not fit its type.
    fn assign(&mut self, property: &str, value: Value) -> Result<(), ParamError>;
}
