//! Process-wide configuration.
//!
//! The only setting is the default timeout, read once from
//! [`TIMEOUT_ENV`] as an integer number of milliseconds.

use core::time::Duration;
use std::sync::LazyLock;

/// Environment variable holding the default timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "TESTDECK_TIMEOUT";

static ENV_TIMEOUT: LazyLock<Option<Duration>> =
    LazyLock::new(|| parse_timeout(std::env::var(TIMEOUT_ENV).ok().as_deref()));

/// Parses a timeout setting.
///
/// Absent or non-numeric values yield `None`, so no default timeout is
/// injected.
#[must_use]
pub fn parse_timeout(raw: Option<&str>) -> Option<Duration> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(err) => {
            tracing::warn!(
                variable = TIMEOUT_ENV,
                value = raw,
                error = %err,
                "ignoring non-numeric default timeout"
            );
            None
        }
    }
}

/// Returns the default timeout configured through the environment.
#[must_use]
pub fn env_default_timeout() -> Option<Duration> {
    *ENV_TIMEOUT
}

/// Configuration applied when composing suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Timeout used when neither the registration nor static defaults set one.
    pub default_timeout: Option<Duration>,
}

impl SuiteConfig {
    /// Creates a configuration with an explicit default timeout.
    #[must_use]
    pub fn new(default_timeout: Option<Duration>) -> Self {
        Self { default_timeout }
    }

    /// Creates a configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env_default_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_milliseconds() {
        assert_eq!(parse_timeout(Some("1500")), Some(Duration::from_millis(1500)));
        assert_eq!(parse_timeout(Some(" 20 ")), Some(Duration::from_millis(20)));
    }

    #[test]
    fn absent_or_invalid_yields_none() {
        assert_eq!(parse_timeout(None), None);
        assert_eq!(parse_timeout(Some("")), None);
        assert_eq!(parse_timeout(Some("soon")), None);
        assert_eq!(parse_timeout(Some("-5")), None);
    }
}
