//! Procedural macros for declaring testdeck fixtures.
//!
//! Provides `#[fixture]` for impl blocks holding hook and test methods, and
//! `#[derive(Parameterized)]` for structs whose fields are assigned per
//! parameterized run.

mod common;
mod fixture;
mod params;

use darling::FromMeta;
use darling::ast::NestedMeta;
use proc_macro::TokenStream;

/// Declares a fixture from an impl block with marked methods.
///
/// Generates a `Fixture` impl whose `declare` registers the inherited
/// declarations first, then every marked method in source order.
///
/// # Fixture Attributes
///
/// - `name = "..."`: suite name, defaulting to the type name
/// - `extends = Base, via = field`: inherit `Base`'s declarations and static
///   defaults through the field holding it
/// - `defaults = path::to::fn`: static default options passed on to fixtures
///   extending this one
///
/// # Method Markers
///
/// - `#[before_all]`, `#[before_each]`, `#[after_each]`, `#[after_all]`:
///   lifecycle hooks, accepting `diagnostic` and `timeout` (milliseconds)
/// - `#[test_case]`: a test, additionally accepting `skip`, `todo`, `only`,
///   `plan` and `concurrency`
/// - `#[test_skipped]`, `#[test_todo]`, `#[test_only]`: a test with the
///   corresponding flag set
/// - `#[constructor]`: an associated function building the instance, taking
///   an optional `&SuiteContext`; without one, `Default` is used
///
/// Marked methods take `&self` or `&mut self` and optionally a
/// `&TestContext`, may be `async`, and return `()` or a `Result<(), E>`.
///
/// # Example
///
/// ```ignore
/// use testdeck_suite::prelude::*;
///
/// #[derive(Default)]
/// struct Connection {
///     open: bool,
/// }
///
/// #[fixture(defaults = connection_defaults)]
/// impl Connection {
///     #[before_each(timeout = 500)]
///     async fn open(&mut self) {
///         self.open = true;
///     }
///
///     #[test_case(diagnostic = "handshake")]
///     fn is_open(&self) -> Result<(), String> {
///         self.open.then_some(()).ok_or_else(|| "closed".into())
///     }
/// }
///
/// fn connection_defaults() -> TestOptions {
///     TestOptions::new().with_timeout(std::time::Duration::from_secs(2))
/// }
/// ```
#[proc_macro_attribute]
pub fn fixture(attr: TokenStream, item: TokenStream) -> TokenStream {
    let nested = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(nested) => nested,
        Err(err) => return darling::Error::from(err).write_errors().into(),
    };
    let args = match fixture::FixtureArgs::from_list(&nested) {
        Ok(args) => args,
        Err(err) => return err.write_errors().into(),
    };
    let input = syn::parse_macro_input!(item as syn::ItemImpl);

    fixture::generate_fixture(&args, &input)
        .unwrap_or_else(darling::Error::write_errors)
        .into()
}

/// Derive macro for the `Parameterized` trait.
///
/// Fields marked `#[param]` become assignable properties, in declaration
/// order. `#[param(rename = "...")]` changes the property name. Values are
/// deserialized with `serde_json`, so field types implement `Deserialize`.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Parameterized)]
/// struct Sizes {
///     #[param]
///     width: u32,
///     #[param(rename = "caption")]
///     label: String,
/// }
/// ```
#[proc_macro_derive(Parameterized, attributes(param))]
pub fn derive_parameterized(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    params::derive_parameterized(&input)
        .unwrap_or_else(darling::Error::write_errors)
        .into()
}
