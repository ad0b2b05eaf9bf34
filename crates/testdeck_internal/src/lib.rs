//! # testdeck Internal Library
//!
//! Re-exports the core testdeck crates for convenience.

/// Fixture annotations, option resolution and suite registration.
pub use testdeck_suite;

/// Local runtime that executes registered suites.
pub use testdeck_runner;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use testdeck_runner::prelude::*;
    pub use testdeck_suite::prelude::*;
}
