//! Turning fixtures into suite registrations.
//!
//! [`Suite`] registers a fixture once, under its own name.
//! [`ParameterizedSuite`] registers one suite per run, each named
//! `"<Fixture> #<index>"` and each assigning its own property values onto a
//! fresh instance.
//!
//! Names get a `": <diagnostic>"` suffix when the resolved options carry a
//! diagnostic. All validation happens in `compose`, before anything is
//! handed to the runtime.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use testdeck_suite::prelude::*;
//!
//! #[derive(Default, Parameterized)]
//! struct Sizes {
//!     #[param]
//!     width: u32,
//!     #[param]
//!     label: String,
//! }
//!
//! #[fixture]
//! impl Sizes {
//!     #[test_case]
//!     fn is_positive(&mut self) {
//!         assert!(self.width > 0, "{}", self.label);
//!     }
//! }
//!
//! let suites = ParameterizedSuite::<Sizes>::new()
//!     .properties(["width", "label"])
//!     .run([json!(1), json!("one")])
//!     .run_with(TestOptions::new().with_diagnostic("large"), [json!(500), json!("big")])
//!     .with_config(SuiteConfig::new(None))
//!     .compose()
//!     .unwrap();
//!
//! let names: Vec<&str> = suites.iter().map(|s| s.name()).collect();
//! assert_eq!(names, ["Sizes #0", "Sizes #1: large"]);
//! ```

use core::fmt;
use core::marker::PhantomData;

use serde_json::Value;

use crate::config::SuiteConfig;
use crate::error::SuiteError;
use crate::fixture::{Fixture, Parameterized};
use crate::options::TestOptions;
use crate::resolve::{OptionResolver, StaticDefaults};
use crate::runtime::{SuiteBody, TestRuntime};
use crate::wiring::{Assign, WiredSuite};

/// Appends the diagnostic, if any, to a suite name.
fn suite_name(base: String, options: &TestOptions) -> String {
    match options.diagnostic.as_deref() {
        Some(diagnostic) if !diagnostic.is_empty() => format!("{base}: {diagnostic}"),
        _ => base,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ComposedSuite
// ─────────────────────────────────────────────────────────────────────────────

/// A validated suite registration, ready for a runtime.
pub struct ComposedSuite<T> {
    name: String,
    options: TestOptions,
    body: WiredSuite<T>,
}

impl<T: Fixture> ComposedSuite<T> {
    /// Returns the suite name, including any diagnostic suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resolved suite options.
    #[must_use]
    pub fn options(&self) -> &TestOptions {
        &self.options
    }

    /// Splits the registration into the parts a runtime consumes.
    #[must_use]
    pub fn into_parts(self) -> (String, TestOptions, Box<dyn SuiteBody>) {
        (self.name, self.options, Box::new(self.body))
    }

    /// Registers the suite with `runtime`.
    pub fn register<R: TestRuntime + ?Sized>(self, runtime: &mut R) {
        tracing::debug!(suite = %self.name, fixture = T::NAME, "registering suite");
        let (name, options, body) = self.into_parts();
        runtime.register_suite(name, options, body);
    }
}

impl<T> fmt::Debug for ComposedSuite<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedSuite")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Suite
// ─────────────────────────────────────────────────────────────────────────────

/// Registration of a plain, non-parameterized fixture.
pub struct Suite<T> {
    options: Option<TestOptions>,
    config: SuiteConfig,
    _fixture: PhantomData<fn() -> T>,
}

impl<T: Fixture> Suite<T> {
    /// Creates a registration without options, configured from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: None,
            config: SuiteConfig::from_env(),
            _fixture: PhantomData,
        }
    }

    /// Sets the registration options.
    #[must_use]
    pub fn with_options(mut self, options: TestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Replaces the configuration read from the environment.
    #[must_use]
    pub fn with_config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the fixture and resolves the suite's name and options.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::OwnStaticOptions`] if `T` declares its own
    /// static defaults.
    pub fn compose(self) -> Result<ComposedSuite<T>, SuiteError> {
        let defaults = StaticDefaults::capture::<T>()?;
        // `capture` guarantees the fixture has no own defaults.
        let options = OptionResolver::from(self.config).resolve(
            defaults.inherited(),
            None,
            self.options.as_ref(),
            None,
        );

        Ok(ComposedSuite {
            name: suite_name(T::NAME.to_owned(), &options),
            options,
            body: WiredSuite::new(defaults, None),
        })
    }

    /// Composes the suite and registers it with `runtime`.
    ///
    /// # Errors
    ///
    /// See [`compose`](Self::compose). On error nothing is registered.
    pub fn register<R: TestRuntime + ?Sized>(self, runtime: &mut R) -> Result<(), SuiteError> {
        self.compose()?.register(runtime);
        Ok(())
    }
}

impl<T: Fixture> Default for Suite<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ParameterizedSuite
// ─────────────────────────────────────────────────────────────────────────────

/// Values of one parameterized run, optionally with run-specific options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunValues {
    options: Option<TestOptions>,
    values: Vec<Value>,
}

impl RunValues {
    /// Creates a run assigning `values` in property order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            options: None,
            values: values.into_iter().collect(),
        }
    }

    /// Sets options overriding the suite's options for this run only.
    #[must_use]
    pub fn with_options(mut self, options: TestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Returns the run's values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the run's option override.
    #[must_use]
    pub fn options(&self) -> Option<&TestOptions> {
        self.options.as_ref()
    }
}

impl From<Vec<Value>> for RunValues {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Registration of a fixture once per set of property values.
pub struct ParameterizedSuite<T> {
    properties: Vec<String>,
    runs: Vec<RunValues>,
    options: Option<TestOptions>,
    config: SuiteConfig,
    _fixture: PhantomData<fn() -> T>,
}

impl<T: Parameterized> ParameterizedSuite<T> {
    /// Creates a registration without properties or runs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            runs: Vec::new(),
            options: None,
            config: SuiteConfig::from_env(),
            _fixture: PhantomData,
        }
    }

    /// Appends properties assigned by every run, in value order.
    #[must_use]
    pub fn properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(properties.into_iter().map(Into::into));
        self
    }

    /// Appends a run.
    #[must_use]
    pub fn run(self, values: impl IntoIterator<Item = Value>) -> Self {
        self.push_run(RunValues::new(values))
    }

    /// Appends a run with options overriding the suite's options.
    #[must_use]
    pub fn run_with(self, options: TestOptions, values: impl IntoIterator<Item = Value>) -> Self {
        self.push_run(RunValues::new(values).with_options(options))
    }

    /// Appends a prepared run.
    #[must_use]
    pub fn push_run(mut self, run: RunValues) -> Self {
        self.runs.push(run);
        self
    }

    /// Sets options shared by all runs.
    #[must_use]
    pub fn with_options(mut self, options: TestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Replaces the configuration read from the environment.
    #[must_use]
    pub fn with_config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    fn check_properties(&self) -> Result<(), SuiteError> {
        for property in &self.properties {
            if !T::PROPERTIES.contains(&property.as_str()) {
                return Err(SuiteError::UnknownProperty {
                    fixture: T::NAME,
                    property: property.clone(),
                    known: T::PROPERTIES.join(", "),
                });
            }
        }
        Ok(())
    }

    /// Validates every run and resolves each run's name and options.
    ///
    /// Without any run, a single run assigning nothing is composed.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::OwnStaticOptions`],
    /// [`SuiteError::UnknownProperty`] or
    /// [`SuiteError::ValueCountMismatch`]; nothing is composed in that case.
    pub fn compose(self) -> Result<Vec<ComposedSuite<T>>, SuiteError> {
        let defaults = StaticDefaults::capture::<T>()?;
        self.check_properties()?;

        let runs = if self.runs.is_empty() {
            vec![RunValues::default()]
        } else {
            self.runs
        };

        for (position, run) in runs.iter().enumerate() {
            if run.values.len() != self.properties.len() {
                return Err(SuiteError::ValueCountMismatch {
                    fixture: T::NAME,
                    position,
                    properties: self.properties.join(", "),
                    expected: self.properties.len(),
                    actual: run.values.len(),
                });
            }
        }

        let resolver = OptionResolver::from(self.config);
        let composed = runs
            .into_iter()
            .enumerate()
            .map(|(position, run)| {
                let options = resolver.resolve(
                    defaults.inherited(),
                    None,
                    self.options.as_ref(),
                    run.options.as_ref(),
                );
                let assignments: Vec<(String, Value)> = self
                    .properties
                    .iter()
                    .cloned()
                    .zip(run.values)
                    .collect();

                ComposedSuite {
                    name: suite_name(format!("{} #{}", T::NAME, position), &options),
                    options,
                    body: WiredSuite::new(defaults.clone(), Some(assigner(position, assignments))),
                }
            })
            .collect();

        Ok(composed)
    }

    /// Composes every run and registers them with `runtime`, in order.
    ///
    /// # Errors
    ///
    /// See [`compose`](Self::compose). On error no run is registered.
    pub fn register<R: TestRuntime + ?Sized>(self, runtime: &mut R) -> Result<(), SuiteError> {
        for suite in self.compose()? {
            suite.register(runtime);
        }
        Ok(())
    }
}

impl<T: Parameterized> Default for ParameterizedSuite<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the deferred overwrite of a run's property values.
fn assigner<T: Parameterized>(position: usize, assignments: Vec<(String, Value)>) -> Assign<T> {
    Box::new(move |fixture: &mut T| {
        for (property, value) in assignments {
            fixture
                .assign(&property, value)
                .map_err(|source| SuiteError::PropertyValue {
                    fixture: T::NAME,
                    position,
                    source,
                })?;
        }
        Ok(())
    })
}
