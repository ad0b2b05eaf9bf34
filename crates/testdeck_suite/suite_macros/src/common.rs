//! Shared parsing and validation helpers for the fixture macros.

use darling::FromMeta;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{Attribute, FnArg, Lit, Meta, Signature, Type};

// ─────────────────────────────────────────────────────────────────────────────
// Method markers
// ─────────────────────────────────────────────────────────────────────────────

/// An inert attribute marking a method inside a `#[fixture]` impl block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodMarker {
    BeforeAll,
    BeforeEach,
    AfterEach,
    AfterAll,
    TestCase,
    TestSkipped,
    TestTodo,
    TestOnly,
    Constructor,
}

impl MethodMarker {
    const ALL: [Self; 9] = [
        Self::BeforeAll,
        Self::BeforeEach,
        Self::AfterEach,
        Self::AfterAll,
        Self::TestCase,
        Self::TestSkipped,
        Self::TestTodo,
        Self::TestOnly,
        Self::Constructor,
    ];

    /// Returns the attribute name, as written by the user.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::BeforeAll => "before_all",
            Self::BeforeEach => "before_each",
            Self::AfterEach => "after_each",
            Self::AfterAll => "after_all",
            Self::TestCase => "test_case",
            Self::TestSkipped => "test_skipped",
            Self::TestTodo => "test_todo",
            Self::TestOnly => "test_only",
            Self::Constructor => "constructor",
        }
    }

    /// Recognizes a marker attribute.
    pub(crate) fn from_attr(attr: &Attribute) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|marker| attr.path().is_ident(marker.name()))
    }

    /// Returns the `DeclarationKind` variant this marker declares, if any.
    pub(crate) fn kind(self) -> Option<Ident> {
        let variant = match self {
            Self::BeforeAll => "BeforeAll",
            Self::BeforeEach => "BeforeEach",
            Self::AfterEach => "AfterEach",
            Self::AfterAll => "AfterAll",
            Self::TestCase | Self::TestSkipped | Self::TestTodo | Self::TestOnly => "Test",
            Self::Constructor => return None,
        };
        Some(Ident::new(variant, Span::call_site()))
    }

    fn is_hook(self) -> bool {
        matches!(
            self,
            Self::BeforeAll | Self::BeforeEach | Self::AfterEach | Self::AfterAll
        )
    }

    /// Parses the marker's arguments into declaration options.
    pub(crate) fn parse_options(self, attr: &Attribute) -> darling::Result<OptionArgs> {
        if self.is_hook() {
            return parse_args::<HookArgs>(attr).map(OptionArgs::from);
        }

        let mut args = parse_args::<OptionArgs>(attr)?;
        match self {
            Self::TestSkipped => {
                args.skip.get_or_insert(MarkerArg::Flag(true));
            }
            Self::TestTodo => {
                args.todo.get_or_insert(MarkerArg::Flag(true));
            }
            Self::TestOnly => {
                args.only.get_or_insert(true);
            }
            _ => {}
        }
        Ok(args)
    }
}

/// Parses marker arguments, treating a bare attribute as all defaults.
fn parse_args<A: FromMeta + Default>(attr: &Attribute) -> darling::Result<A> {
    match &attr.meta {
        Meta::Path(_) => Ok(A::default()),
        meta => A::from_meta(meta),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Option arguments
// ─────────────────────────────────────────────────────────────────────────────

/// A `skip` or `todo` value: a flag or a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkerArg {
    Flag(bool),
    Reason(String),
}

impl FromMeta for MarkerArg {
    fn from_word() -> darling::Result<Self> {
        Ok(Self::Flag(true))
    }

    fn from_bool(value: bool) -> darling::Result<Self> {
        Ok(Self::Flag(value))
    }

    fn from_string(value: &str) -> darling::Result<Self> {
        Ok(Self::Reason(value.to_owned()))
    }
}

/// A `concurrency` value: a flag or a limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConcurrencyArg {
    Enabled(bool),
    Limit(usize),
}

impl FromMeta for ConcurrencyArg {
    fn from_word() -> darling::Result<Self> {
        Ok(Self::Enabled(true))
    }

    fn from_value(value: &Lit) -> darling::Result<Self> {
        match value {
            Lit::Bool(flag) => Ok(Self::Enabled(flag.value)),
            Lit::Int(limit) => limit
                .base10_parse::<usize>()
                .map(Self::Limit)
                .map_err(darling::Error::from),
            other => Err(darling::Error::unexpected_lit_type(other)),
        }
    }
}

/// Arguments accepted by lifecycle hook markers.
#[derive(Debug, Default, FromMeta)]
struct HookArgs {
    diagnostic: Option<String>,
    /// Milliseconds.
    timeout: Option<u64>,
}

/// Arguments accepted by test case markers.
#[derive(Debug, Default, FromMeta)]
pub(crate) struct OptionArgs {
    pub(crate) diagnostic: Option<String>,
    /// Milliseconds.
    pub(crate) timeout: Option<u64>,
    pub(crate) skip: Option<MarkerArg>,
    pub(crate) todo: Option<MarkerArg>,
    pub(crate) only: Option<bool>,
    pub(crate) plan: Option<u32>,
    pub(crate) concurrency: Option<ConcurrencyArg>,
}

impl From<HookArgs> for OptionArgs {
    fn from(args: HookArgs) -> Self {
        Self {
            diagnostic: args.diagnostic,
            timeout: args.timeout,
            ..Self::default()
        }
    }
}

impl OptionArgs {
    fn is_empty(&self) -> bool {
        self.diagnostic.is_none()
            && self.timeout.is_none()
            && self.skip.is_none()
            && self.todo.is_none()
            && self.only.is_none()
            && self.plan.is_none()
            && self.concurrency.is_none()
    }

    /// Emits an `Option<TestOptions>` expression.
    pub(crate) fn to_tokens(&self, ts: &TokenStream) -> TokenStream {
        if self.is_empty() {
            return quote! { ::core::option::Option::None };
        }

        let marker = |arg: &MarkerArg| match arg {
            MarkerArg::Flag(flag) => quote!(#flag),
            MarkerArg::Reason(reason) => quote!(#reason),
        };

        let mut calls = Vec::new();
        if let Some(diagnostic) = &self.diagnostic {
            calls.push(quote!(.with_diagnostic(#diagnostic)));
        }
        if let Some(timeout) = self.timeout {
            calls.push(quote!(.with_timeout(::core::time::Duration::from_millis(#timeout))));
        }
        if let Some(skip) = &self.skip {
            let skip = marker(skip);
            calls.push(quote!(.with_skip(#skip)));
        }
        if let Some(todo) = &self.todo {
            let todo = marker(todo);
            calls.push(quote!(.with_todo(#todo)));
        }
        if let Some(only) = self.only {
            calls.push(quote!(.with_only(#only)));
        }
        if let Some(plan) = self.plan {
            calls.push(quote!(.with_plan(#plan)));
        }
        match &self.concurrency {
            Some(ConcurrencyArg::Enabled(flag)) => {
                calls.push(quote!(.with_concurrency(#ts::Concurrency::Enabled(#flag))));
            }
            Some(ConcurrencyArg::Limit(limit)) => {
                calls.push(quote!(.with_concurrency(#ts::Concurrency::Limit(#limit))));
            }
            None => {}
        }

        quote! {
            ::core::option::Option::Some(#ts::TestOptions::new() #(#calls)*)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Signature validation
// ─────────────────────────────────────────────────────────────────────────────

/// Shape of a validated hook or test method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MethodShape {
    pub(crate) takes_context: bool,
    pub(crate) is_async: bool,
}

fn check_plain(marker: MethodMarker, sig: &Signature) -> darling::Result<()> {
    let name = marker.name();
    if let Some(unsafety) = &sig.unsafety {
        return Err(
            darling::Error::custom(format!("#[{name}] cannot be applied to unsafe functions"))
                .with_span(unsafety),
        );
    }
    if let Some(abi) = &sig.abi {
        return Err(
            darling::Error::custom(format!("#[{name}] cannot be applied to extern functions"))
                .with_span(abi),
        );
    }
    if !sig.generics.params.is_empty() {
        return Err(
            darling::Error::custom(format!("#[{name}] does not support generic parameters"))
                .with_span(&sig.generics),
        );
    }
    Ok(())
}

/// Validates a hook or test method signature.
///
/// Accepted: `fn name(&self | &mut self [, context: &TestContext])`,
/// optionally `async`.
pub(crate) fn validate_method(marker: MethodMarker, sig: &Signature) -> darling::Result<MethodShape> {
    check_plain(marker, sig)?;
    let name = marker.name();

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_none() => {
            return Err(darling::Error::custom(format!(
                "#[{name}] methods must take `&self` or `&mut self`, not `self` by value"
            ))
            .with_span(receiver));
        }
        Some(FnArg::Receiver(_)) => {}
        _ => {
            return Err(darling::Error::custom(format!(
                "#[{name}] can only be used on instance methods; associated functions have no instance to run on"
            ))
            .with_span(&sig.ident));
        }
    }

    if sig.inputs.len() > 2 {
        return Err(darling::Error::custom(format!(
            "#[{name}] methods take at most one argument besides the receiver: `&TestContext`"
        ))
        .with_span(&sig.inputs));
    }

    Ok(MethodShape {
        takes_context: sig.inputs.len() == 2,
        is_async: sig.asyncness.is_some(),
    })
}

/// Validates a `#[constructor]` signature, returning whether it takes the suite context.
///
/// Accepted: `fn name([context: &SuiteContext]) -> Self`.
pub(crate) fn validate_constructor(sig: &Signature) -> darling::Result<bool> {
    check_plain(MethodMarker::Constructor, sig)?;

    if let Some(asyncness) = &sig.asyncness {
        return Err(darling::Error::custom("#[constructor] cannot be async").with_span(asyncness));
    }
    if let Some(FnArg::Receiver(receiver)) = sig.inputs.first() {
        return Err(
            darling::Error::custom("#[constructor] must be an associated function without a receiver")
                .with_span(receiver),
        );
    }
    if sig.inputs.len() > 1 {
        return Err(darling::Error::custom(
            "#[constructor] takes at most one argument: `&SuiteContext`",
        )
        .with_span(&sig.inputs));
    }

    Ok(sig.inputs.len() == 1)
}

/// Returns the last path segment of the impl target, used as the fixture name.
pub(crate) fn type_name_str(ty: &Type) -> darling::Result<String> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
    {
        return Ok(segment.ident.to_string());
    }
    Err(darling::Error::custom("#[fixture] impl target must be a path type").with_span(ty))
}
