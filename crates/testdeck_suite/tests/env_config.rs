//! Default timeout taken from the process environment.
//!
//! The variable is read once per process, so this file holds a single test.

use std::time::Duration;

use testdeck_suite::TIMEOUT_ENV;
use testdeck_suite::prelude::*;

#[derive(Default)]
struct Timed;

#[fixture]
impl Timed {
    #[test_case]
    fn runs(&self) {}
}

#[test]
fn environment_timeout_reaches_composed_suites() {
    // SAFETY: this is the only test in the binary, so no other thread reads
    // or writes the environment concurrently.
    unsafe { std::env::set_var(TIMEOUT_ENV, "750") };

    assert_eq!(
        SuiteConfig::from_env().default_timeout,
        Some(Duration::from_millis(750))
    );

    let suite = Suite::<Timed>::new().compose().unwrap();
    assert_eq!(suite.options().timeout, Some(Duration::from_millis(750)));

    let explicit = Suite::<Timed>::new()
        .with_options(TestOptions::new().with_timeout(Duration::from_millis(40)))
        .compose()
        .unwrap();
    assert_eq!(explicit.options().timeout, Some(Duration::from_millis(40)));
}
