//! Shared utilities for testdeck procedural macro crates.
//!
//! Provides crate-path resolution so that generated code emits correct
//! fully-qualified paths regardless of whether the consumer depends on
//! an individual testdeck crate or the `testdeck` umbrella re-export.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// A testdeck crate that macro-generated code may reference.
pub enum TestdeckCrate {
    /// `testdeck_suite`
    Suite,
}

impl TestdeckCrate {
    /// Returns the `Cargo.toml` package name for this crate.
    fn as_str(&self) -> &'static str {
        match self {
            Self::Suite => "testdeck_suite",
        }
    }
}

/// Returns a [`TokenStream`] path for the given testdeck crate.
///
/// Resolution order:
/// 1. Direct dependency (possibly renamed in `Cargo.toml`).
/// 2. Indirect access via the `testdeck` umbrella crate (`testdeck::<name>`),
///    including from the umbrella crate's own tests.
/// 3. Fallback to the literal crate name (compile error will point the user
///    to the missing dependency).
pub fn resolve_crate_path(krate: TestdeckCrate) -> TokenStream {
    let name = krate.as_str();

    match crate_name(name) {
        Ok(FoundCrate::Itself) => {
            let ident = format_ident!("{}", name);
            quote!(#ident)
        }
        Ok(FoundCrate::Name(found)) => {
            let ident = format_ident!("{}", found);
            quote!(#ident)
        }
        Err(_) => match crate_name("testdeck") {
            // Tests and doctests of the umbrella crate itself
            Ok(FoundCrate::Itself) => {
                let ident = format_ident!("{}", name);
                quote!(testdeck::#ident)
            }
            Ok(FoundCrate::Name(found)) => {
                let umbrella = format_ident!("{}", found);
                let ident = format_ident!("{}", name);
                quote!(#umbrella::#ident)
            }
            _ => {
                let ident = format_ident!("{}", name);
                quote!(#ident)
            }
        },
    }
}
