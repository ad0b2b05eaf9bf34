//! Per-instance registry of declared hooks and test cases.
//!
//! A [`Declarations`] registry is built next to every constructed fixture
//! instance by [`Fixture::declare`]. Entries keep insertion order, and
//! inherited entries are imported before the fixture's own, so for any two
//! entries of the same kind the ancestor's comes first.
//!
//! # Example
//!
//! ```
//! use testdeck_suite::prelude::*;
//!
//! #[derive(Default)]
//! struct Base {
//!     calls: Vec<&'static str>,
//! }
//!
//! #[fixture]
//! impl Base {
//!     #[before_each]
//!     fn prepare(&mut self) {
//!         self.calls.push("base");
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Derived {
//!     base: Base,
//! }
//!
//! #[fixture(extends = Base, via = base)]
//! impl Derived {
//!     #[before_each]
//!     fn prepare(&mut self) {}
//!
//!     #[test_case]
//!     fn works(&mut self) {}
//! }
//!
//! let mut declarations = Declarations::<Derived>::new(Derived::NAME);
//! Derived::declare(&mut declarations).unwrap();
//!
//! let order: Vec<String> = declarations.iter().map(|d| d.id().to_string()).collect();
//! assert_eq!(order, ["Base::prepare", "Derived::prepare", "Derived::works"]);
//! ```

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::context::TestContext;
use crate::error::SuiteError;
use crate::fixture::Fixture;
use crate::options::TestOptions;
use crate::runtime::{BoxFuture, TestResult};

// ─────────────────────────────────────────────────────────────────────────────
// DeclarationKind
// ─────────────────────────────────────────────────────────────────────────────

/// The role a declared method plays in its suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// Runs once before all tests.
    BeforeAll,
    /// Runs before every test.
    BeforeEach,
    /// Runs after every test.
    AfterEach,
    /// Runs once after all tests.
    AfterAll,
    /// A test case.
    Test,
}

impl DeclarationKind {
    /// Returns the kebab-case name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeAll => "before-all",
            Self::BeforeEach => "before-each",
            Self::AfterEach => "after-each",
            Self::AfterAll => "after-all",
            Self::Test => "test",
        }
    }

    /// Returns whether this kind is a lifecycle hook rather than a test.
    #[must_use]
    pub fn is_hook(&self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MethodId
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of a declared method: the fixture defining it and its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    fixture: &'static str,
    method: &'static str,
}

impl MethodId {
    /// Creates an identifier for `method` defined on `fixture`.
    #[must_use]
    pub const fn new(fixture: &'static str, method: &'static str) -> Self {
        Self { fixture, method }
    }

    /// Returns the name of the fixture defining the method.
    #[must_use]
    pub fn fixture(&self) -> &'static str {
        self.fixture
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.method
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.fixture, self.method)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declaration
// ─────────────────────────────────────────────────────────────────────────────

/// Type-erased declared method, invoked on a fixture instance.
pub type Method<T> =
    Arc<dyn for<'a> Fn(&'a mut T, &'a TestContext) -> BoxFuture<'a, TestResult> + Send + Sync>;

/// Wraps a closure or function into a [`Method`].
///
/// Passing the closure through this function gives it the higher-ranked
/// signature the registry needs.
pub fn method<T, F>(f: F) -> Method<T>
where
    F: for<'a> Fn(&'a mut T, &'a TestContext) -> BoxFuture<'a, TestResult> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One entry of the registry.
pub struct Declaration<T> {
    kind: DeclarationKind,
    id: MethodId,
    options: Option<TestOptions>,
    method: Method<T>,
}

impl<T: 'static> Declaration<T> {
    /// Returns the declared role.
    #[must_use]
    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Returns the identity of the declared method.
    #[must_use]
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Returns the name used when registering the entry, i.e. the method name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.id.method()
    }

    /// Returns the options attached to the declaration.
    #[must_use]
    pub fn options(&self) -> Option<&TestOptions> {
        self.options.as_ref()
    }

    /// Invokes the declared method on `instance`.
    pub fn invoke<'a>(&self, instance: &'a mut T, context: &'a TestContext) -> BoxFuture<'a, TestResult> {
        (self.method)(instance, context)
    }

    /// Consumes the entry, returning its method.
    #[must_use]
    pub fn into_method(self) -> Method<T> {
        self.method
    }

    /// Lifts the entry onto a fixture embedding `T`.
    fn project<D: 'static>(self, project: fn(&mut D) -> &mut T) -> Declaration<D> {
        let inner = self.method;
        Declaration {
            kind: self.kind,
            id: self.id,
            options: self.options,
            method: method(move |instance, context| inner(project(instance), context)),
        }
    }
}

impl<T> fmt::Debug for Declaration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered registry of the hooks and test cases declared for one instance.
pub struct Declarations<T> {
    fixture: &'static str,
    entries: IndexMap<MethodId, Declaration<T>>,
    has_own: bool,
}

impl<T: 'static> Declarations<T> {
    /// Creates an empty registry for the named fixture.
    #[must_use]
    pub fn new(fixture: &'static str) -> Self {
        Self {
            fixture,
            entries: IndexMap::new(),
            has_own: false,
        }
    }

    /// Returns the name of the fixture owning this registry.
    #[must_use]
    pub fn fixture(&self) -> &'static str {
        self.fixture
    }

    /// Declares a method of the owning fixture.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::DuplicateDeclaration`] if `id` is already present.
    pub fn declare<F>(
        &mut self,
        kind: DeclarationKind,
        id: MethodId,
        options: Option<TestOptions>,
        f: F,
    ) -> Result<&mut Self, SuiteError>
    where
        F: for<'a> Fn(&'a mut T, &'a TestContext) -> BoxFuture<'a, TestResult>
            + Send
            + Sync
            + 'static,
    {
        self.insert(Declaration {
            kind,
            id,
            options,
            method: method(f),
        })?;
        self.has_own = true;
        Ok(self)
    }

    /// Imports every declaration of the base fixture `B`, reached through `project`.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::LateInheritance`] if the owning fixture already
    /// declared its own methods, and propagates any error raised while `B`
    /// declares its methods.
    pub fn inherit<B: Fixture>(
        &mut self,
        project: fn(&mut T) -> &mut B,
    ) -> Result<&mut Self, SuiteError> {
        if self.has_own {
            return Err(SuiteError::LateInheritance {
                fixture: self.fixture,
                base: B::NAME,
            });
        }

        let mut base = Declarations::<B>::new(B::NAME);
        B::declare(&mut base)?;
        for (_, declaration) in base.entries {
            self.insert(declaration.project(project))?;
        }
        Ok(self)
    }

    fn insert(&mut self, declaration: Declaration<T>) -> Result<(), SuiteError> {
        if self.entries.contains_key(&declaration.id) {
            return Err(SuiteError::DuplicateDeclaration {
                fixture: self.fixture,
                method: declaration.id.to_string(),
            });
        }

        tracing::trace!(
            fixture = self.fixture,
            method = %declaration.id,
            kind = %declaration.kind,
            "declared"
        );
        self.entries.insert(declaration.id, declaration);
        Ok(())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether a method with this identity was declared.
    #[must_use]
    pub fn contains(&self, id: MethodId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration<T>> {
        self.entries.values()
    }

    /// Iterates entries of one kind in registration order.
    pub fn of_kind(&self, kind: DeclarationKind) -> impl Iterator<Item = &Declaration<T>> {
        self.iter().filter(move |declaration| declaration.kind == kind)
    }
}

impl<T> IntoIterator for Declarations<T> {
    type Item = Declaration<T>;
    type IntoIter = indexmap::map::IntoValues<MethodId, Declaration<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<T> fmt::Debug for Declarations<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declarations")
            .field("fixture", &self.fixture)
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
