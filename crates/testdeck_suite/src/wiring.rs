//! Construction of fixture instances and their registration with a runtime.
//!
//! This runs inside the deferred suite body. Every fallible step (static
//! defaults check, construction, declaration, value assignment) completes
//! before the first registration is issued, so a failing body registers
//! nothing.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Mutex;

use crate::context::{SuiteContext, TestContext};
use crate::declare::{Declaration, DeclarationKind, Declarations};
use crate::error::SuiteError;
use crate::fixture::Fixture;
use crate::options::HookOptions;
use crate::resolve::StaticDefaults;
use crate::runtime::{BoxFuture, EachPhase, Executable, OncePhase, SuiteBody, SuiteScope};

/// Deferred assignment of parameterized values onto a constructed fixture.
pub(crate) type Assign<T> = Box<dyn FnOnce(&mut T) -> Result<(), SuiteError> + Send>;

/// A constructed fixture together with its populated registry.
pub struct Instance<T> {
    fixture: T,
    declarations: Declarations<T>,
}

impl<T: Fixture> Instance<T> {
    /// Constructs the fixture and populates its registry.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by [`Fixture::declare`].
    pub fn construct(context: &SuiteContext) -> Result<Self, SuiteError> {
        let fixture = T::construct(context);
        let mut declarations = Declarations::new(T::NAME);
        T::declare(&mut declarations)?;
        Ok(Self {
            fixture,
            declarations,
        })
    }

    /// Returns the constructed fixture.
    pub fn fixture_mut(&mut self) -> &mut T {
        &mut self.fixture
    }

    /// Returns the registry populated for this instance.
    #[must_use]
    pub fn declarations(&self) -> &Declarations<T> {
        &self.declarations
    }

    /// Registers every declared entry on `scope`, returning how many were issued.
    pub fn wire(self, scope: &mut dyn SuiteScope) -> usize {
        let Instance {
            fixture,
            declarations,
        } = self;
        let shared = Arc::new(Mutex::new(fixture));
        let mut issued = 0;

        for declaration in declarations {
            let kind = declaration.kind();
            let id = declaration.id();
            let options = declaration.options().cloned().unwrap_or_default();
            let executable = bind(&shared, declaration);

            tracing::debug!(fixture = T::NAME, method = %id, kind = %kind, "registering");
            match kind {
                DeclarationKind::BeforeAll => scope.register_hook_once(
                    OncePhase::Before,
                    executable,
                    HookOptions::from(&options),
                ),
                DeclarationKind::BeforeEach => scope.register_hook_per_test(
                    EachPhase::Before,
                    executable,
                    HookOptions::from(&options),
                ),
                DeclarationKind::AfterEach => scope.register_hook_per_test(
                    EachPhase::After,
                    executable,
                    HookOptions::from(&options),
                ),
                DeclarationKind::AfterAll => scope.register_hook_once(
                    OncePhase::After,
                    executable,
                    HookOptions::from(&options),
                ),
                DeclarationKind::Test => scope.register_test(id.method(), options, executable),
            }
            issued += 1;
        }

        issued
    }
}

/// Binds a declaration to the shared instance.
///
/// With a non-empty diagnostic configured, the executable emits it through the test
/// context before delegating; errors from the method pass through untouched.
fn bind<T: Send + 'static>(instance: &Arc<Mutex<T>>, declaration: Declaration<T>) -> Executable {
    let instance = Arc::clone(instance);
    let diagnostic = declaration
        .options()
        .and_then(|options| options.diagnostic.clone())
        .filter(|diagnostic| !diagnostic.is_empty());
    let method = declaration.into_method();

    match diagnostic {
        Some(diagnostic) => Arc::new(move |context: TestContext| {
            let instance = Arc::clone(&instance);
            let method = Arc::clone(&method);
            let diagnostic = diagnostic.clone();
            async move {
                context.diagnostic(&diagnostic);
                let mut fixture = instance.lock().await;
                method(&mut *fixture, &context).await
            }
            .boxed()
        }),
        None => Arc::new(move |context: TestContext| {
            let instance = Arc::clone(&instance);
            let method = Arc::clone(&method);
            async move {
                let mut fixture = instance.lock().await;
                method(&mut *fixture, &context).await
            }
            .boxed()
        }),
    }
}

/// Body handed to the runtime for one composed suite.
pub(crate) struct WiredSuite<T> {
    defaults: StaticDefaults,
    assign: Option<Assign<T>>,
}

impl<T: Fixture> WiredSuite<T> {
    pub(crate) fn new(defaults: StaticDefaults, assign: Option<Assign<T>>) -> Self {
        Self { defaults, assign }
    }
}

impl<T: Fixture> SuiteBody for WiredSuite<T> {
    fn run<'s>(
        self: Box<Self>,
        context: SuiteContext,
        scope: &'s mut dyn SuiteScope,
    ) -> BoxFuture<'s, Result<(), SuiteError>> {
        async move {
            // Let pending static initialization settle before reading it.
            tokio::task::yield_now().await;

            let WiredSuite { defaults, assign } = *self;
            defaults.revalidate::<T>()?;

            let mut instance = Instance::<T>::construct(&context)?;
            if let Some(assign) = assign {
                assign(instance.fixture_mut())?;
            }

            let issued = instance.wire(scope);
            tracing::debug!(suite = context.name(), issued, "suite wired");
            Ok(())
        }
        .boxed()
    }
}
