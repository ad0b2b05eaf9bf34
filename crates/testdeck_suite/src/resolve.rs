//! Merging of option sources into one effective option set.
//!
//! Precedence, lowest first: inherited static defaults, own static defaults,
//! registration options, per-run override. The timeout follows its own
//! fallback: registration (including run override), then static defaults,
//! then the configured default.

use core::time::Duration;

use crate::config::SuiteConfig;
use crate::error::SuiteError;
use crate::fixture::Fixture;
use crate::options::TestOptions;

/// Returns the static defaults `F` passes on to its descendants.
///
/// This is `F`'s own defaults overlaid on whatever `F` itself inherited.
#[must_use]
pub fn static_defaults_of<F: Fixture>() -> Option<TestOptions> {
    match (F::inherited_options(), F::suite_options()) {
        (Some(inherited), Some(own)) => Some(inherited.overlay(&own)),
        (inherited, own) => own.or(inherited),
    }
}

/// Snapshot of a registered fixture's static defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDefaults {
    fixture: &'static str,
    inherited: Option<TestOptions>,
}

impl StaticDefaults {
    /// Captures the static defaults of a fixture about to be registered.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::OwnStaticOptions`] if `F` declares defaults
    /// itself instead of inheriting them.
    pub fn capture<F: Fixture>() -> Result<Self, SuiteError> {
        if F::suite_options().is_some() {
            return Err(SuiteError::OwnStaticOptions { fixture: F::NAME });
        }

        Ok(Self {
            fixture: F::NAME,
            inherited: F::inherited_options(),
        })
    }

    /// Checks that `F`'s static defaults still match this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::OwnStaticOptions`] if `F` now declares its own
    /// defaults, or [`SuiteError::StaticOptionsChanged`] if the inherited
    /// defaults differ. Abort signals are compared by presence only, since a
    /// defaults function builds a fresh signal on every call.
    pub fn revalidate<F: Fixture>(&self) -> Result<(), SuiteError> {
        let current = Self::capture::<F>()?;
        if !same_defaults(current.inherited.as_ref(), self.inherited.as_ref()) {
            return Err(SuiteError::StaticOptionsChanged { fixture: F::NAME });
        }
        Ok(())
    }

    /// Returns the inherited defaults.
    #[must_use]
    pub fn inherited(&self) -> Option<&TestOptions> {
        self.inherited.as_ref()
    }
}

fn same_defaults(a: Option<&TestOptions>, b: Option<&TestOptions>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.signal.is_some() == b.signal.is_some() && without_signal(a) == without_signal(b)
        }
        (None, None) => true,
        _ => false,
    }
}

fn without_signal(options: &TestOptions) -> TestOptions {
    TestOptions {
        signal: None,
        ..options.clone()
    }
}

/// Merges option sources, applying the configured default timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionResolver {
    default_timeout: Option<Duration>,
}

impl OptionResolver {
    /// Creates a resolver falling back to `default_timeout`.
    #[must_use]
    pub fn new(default_timeout: Option<Duration>) -> Self {
        Self { default_timeout }
    }

    /// Resolves the effective options of one registration.
    #[must_use]
    pub fn resolve(
        &self,
        inherited: Option<&TestOptions>,
        own: Option<&TestOptions>,
        call: Option<&TestOptions>,
        run: Option<&TestOptions>,
    ) -> TestOptions {
        let empty = TestOptions::default();
        let statics = inherited.unwrap_or(&empty).overlay(own.unwrap_or(&empty));
        let explicit = call.unwrap_or(&empty).overlay(run.unwrap_or(&empty));

        let mut resolved = statics.overlay(&explicit);
        resolved.timeout = explicit
            .timeout
            .or(statics.timeout)
            .or(self.default_timeout);
        resolved
    }
}

impl From<SuiteConfig> for OptionResolver {
    fn from(config: SuiteConfig) -> Self {
        Self::new(config.default_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SuiteContext;
    use crate::declare::Declarations;
    use crate::options::AbortSignal;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn later_sources_win_per_field() {
        let inherited = TestOptions::new().with_diagnostic("inherited").with_todo(true);
        let own = TestOptions::new().with_diagnostic("own");
        let call = TestOptions::new().with_skip("call");
        let run = TestOptions::new().with_diagnostic("run");

        let resolved = OptionResolver::default().resolve(
            Some(&inherited),
            Some(&own),
            Some(&call),
            Some(&run),
        );

        assert_eq!(resolved.diagnostic.as_deref(), Some("run"));
        assert!(resolved.is_todo());
        assert!(resolved.is_skipped());
        assert_eq!(resolved.timeout, None);
    }

    #[test]
    fn timeout_fallback_chain() {
        let statics = TestOptions::new().with_timeout(ms(200));
        let call = TestOptions::new().with_timeout(ms(300));
        let run = TestOptions::new().with_timeout(ms(400));
        let resolver = OptionResolver::new(Some(ms(100)));

        let pick = |s: Option<&TestOptions>, c: Option<&TestOptions>, r: Option<&TestOptions>| {
            resolver.resolve(s, None, c, r).timeout
        };

        assert_eq!(pick(Some(&statics), Some(&call), Some(&run)), Some(ms(400)));
        assert_eq!(pick(Some(&statics), Some(&call), None), Some(ms(300)));
        assert_eq!(pick(Some(&statics), None, None), Some(ms(200)));
        assert_eq!(pick(None, None, None), Some(ms(100)));
        assert_eq!(OptionResolver::default().resolve(None, None, None, None).timeout, None);
    }

    struct Root;
    struct Leaf;

    impl Fixture for Root {
        const NAME: &'static str = "Root";

        fn construct(_context: &SuiteContext) -> Self {
            Root
        }

        fn declare(_declarations: &mut Declarations<Self>) -> Result<(), SuiteError> {
            Ok(())
        }

        fn suite_options() -> Option<TestOptions> {
            Some(TestOptions::new().with_todo(true))
        }
    }

    impl Fixture for Leaf {
        const NAME: &'static str = "Leaf";

        fn construct(_context: &SuiteContext) -> Self {
            Leaf
        }

        fn declare(_declarations: &mut Declarations<Self>) -> Result<(), SuiteError> {
            Ok(())
        }

        fn inherited_options() -> Option<TestOptions> {
            static_defaults_of::<Root>()
        }
    }

    #[test]
    fn ancestor_defaults_are_captured() {
        let defaults = StaticDefaults::capture::<Leaf>().unwrap();
        assert!(defaults.inherited().is_some_and(TestOptions::is_todo));
        defaults.revalidate::<Leaf>().unwrap();
    }

    #[test]
    fn own_defaults_are_rejected() {
        let err = StaticDefaults::capture::<Root>().unwrap_err();
        assert!(matches!(err, SuiteError::OwnStaticOptions { fixture: "Root" }));
        assert!(err.to_string().contains("only on their base fixtures"));
    }

    #[test]
    fn changed_defaults_are_detected() {
        let stale = StaticDefaults {
            fixture: "Leaf",
            inherited: None,
        };
        let err = stale.revalidate::<Leaf>().unwrap_err();
        assert!(matches!(err, SuiteError::StaticOptionsChanged { fixture: "Leaf" }));
    }

    #[test]
    fn signals_compare_by_presence() {
        let signalled = TestOptions::new().with_signal(AbortSignal::new());
        let fresh = TestOptions::new().with_signal(AbortSignal::new());
        assert!(same_defaults(Some(&signalled), Some(&fresh)));
        assert!(!same_defaults(Some(&signalled), Some(&TestOptions::new())));
        assert!(!same_defaults(Some(&signalled), None));
    }
}
