//! Structured logging setup for runs.
//!
//! The runner logs through `tracing`: suite starts and the final summary at
//! `info`, registrations and test outcomes at `debug`, hook and body failures
//! at `warn`. [`LogConfig::init`] installs a global `tracing-subscriber` for
//! binaries and test harnesses that do not install their own.
//!
//! # Example
//!
//! ```
//! use testdeck_runner::logging::{LogConfig, LogFormat};
//! use tracing::Level;
//!
//! LogConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(LogFormat::Compact)
//!     .with_env_filter("testdeck_runner=debug,testdeck_suite=trace")
//!     .init();
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// LogFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-oriented output.
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// Newline-delimited JSON.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// LogConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the global subscriber.
#[derive(Debug, Clone)]
pub struct LogConfig {
    level: Level,
    format: LogFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Creates a configuration logging at `info` in the pretty format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum level, used when no env filter is given.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets an `EnvFilter` directive string, such as `"testdeck_runner=debug"`.
    ///
    /// An invalid directive falls back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Logs span enter and exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured format.
    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }

    fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// Returns `false` if a global subscriber was already installed, in which
    /// case that one stays in place.
    pub fn init(&self) -> bool {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(self.filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(self.filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            LogFormat::Json => tracing_subscriber::registry()
                .with(self.filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
        };

        if installed {
            tracing::debug!(level = %self.level, format = ?self.format, "logging initialized");
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pretty_info() {
        let config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.format(), LogFormat::Pretty);
        assert!(!config.span_events);
    }

    #[test]
    fn builder_sets_fields() {
        let config = LogConfig::new()
            .with_level(Level::TRACE)
            .with_format(LogFormat::Json)
            .with_env_filter("testdeck_suite=trace")
            .with_span_events(true);

        assert_eq!(config.level(), Level::TRACE);
        assert_eq!(config.format(), LogFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("testdeck_suite=trace"));
        assert!(config.span_events);
    }

    #[test]
    fn second_init_keeps_the_first_subscriber() {
        LogConfig::new().with_format(LogFormat::Compact).init();
        assert!(!LogConfig::new().init());
    }
}
