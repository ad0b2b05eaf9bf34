//! Configuration errors raised while declaring, registering and wiring suites.

/// Error assigning a parameterized property value onto a fixture.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// The fixture has no parameterized property with this name.
    #[error("no parameterized property named '{0}'")]
    Unknown(String),

    /// The value could not be converted into the property's type.
    #[error("cannot assign value to '{property}': {source}")]
    Deserialize {
        /// The property being assigned.
        property: String,
        /// The underlying conversion error.
        #[source]
        source: serde_json::Error,
    },
}

impl ParamError {
    /// Creates an [`Unknown`](Self::Unknown) error.
    pub fn unknown(property: impl Into<String>) -> Self {
        Self::Unknown(property.into())
    }

    /// Creates a [`Deserialize`](Self::Deserialize) error.
    pub fn deserialize(property: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Deserialize {
            property: property.into(),
            source,
        }
    }
}

/// Fatal configuration error.
///
/// These are raised before any test of the affected suite executes and are
/// never downgraded: a misconfigured suite registers nothing.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// A registered fixture declares static default options itself.
    #[error(
        "{fixture}: static suite options are not supported on registered fixtures, only on their base \
         fixtures; use Suite::with_options() or ParameterizedSuite::with_options() to set options \
         for this fixture"
    )]
    OwnStaticOptions {
        /// The offending fixture.
        fixture: &'static str,
    },

    /// The static defaults seen at execution differ from those seen at registration.
    #[error(
        "{fixture}: static suite options changed between registration and execution; declare \
         them once on a shared base fixture"
    )]
    StaticOptionsChanged {
        /// The offending fixture.
        fixture: &'static str,
    },

    /// A parameterized run provides the wrong number of values.
    #[error(
        "{fixture}: use exact number of values at position {position} for parameterized \
         properties [{properties}] (expected {expected}, got {actual})"
    )]
    ValueCountMismatch {
        /// The offending fixture.
        fixture: &'static str,
        /// Index of the run.
        position: usize,
        /// Comma-separated list of declared properties.
        properties: String,
        /// Number of declared properties.
        expected: usize,
        /// Number of values provided by the run.
        actual: usize,
    },

    /// A parameterized suite names a property the fixture does not declare.
    #[error("{fixture}: unknown parameterized property '{property}', expected one of [{known}]")]
    UnknownProperty {
        /// The offending fixture.
        fixture: &'static str,
        /// The unknown property name.
        property: String,
        /// Comma-separated list of properties the fixture declares.
        known: String,
    },

    /// A run value could not be assigned onto the constructed fixture.
    #[error("{fixture}: invalid value at position {position}: {source}")]
    PropertyValue {
        /// The offending fixture.
        fixture: &'static str,
        /// Index of the run.
        position: usize,
        /// The assignment failure.
        #[source]
        source: ParamError,
    },

    /// The same method was declared twice for one fixture instance.
    #[error("{fixture}: method {method} is declared more than once")]
    DuplicateDeclaration {
        /// The fixture whose registry rejected the entry.
        fixture: &'static str,
        /// The duplicated method.
        method: String,
    },

    /// Base declarations were imported after the fixture declared its own.
    #[error(
        "{fixture}: declarations inherited from {base} must be imported before any own declaration"
    )]
    LateInheritance {
        /// The fixture whose registry rejected the import.
        fixture: &'static str,
        /// The base fixture being imported.
        base: &'static str,
    },
}
