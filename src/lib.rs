//! Declarative test suites for Rust.
//!
//! Fixtures are plain types whose annotated methods become hooks and test
//! cases of a suite registered with a test runtime.

pub use testdeck_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use testdeck_internal::prelude::*;
}
