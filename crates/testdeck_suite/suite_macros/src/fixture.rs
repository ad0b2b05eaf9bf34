//! Code generation for `#[fixture]` on impl blocks.

use darling::FromMeta;
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{ImplItem, ItemImpl, Path};

use crate::common::{MethodMarker, MethodShape, type_name_str, validate_constructor, validate_method};

/// Arguments of the `#[fixture(...)]` attribute.
#[derive(Debug, Default, FromMeta)]
pub(crate) struct FixtureArgs {
    /// Overrides the fixture name, which defaults to the type name.
    name: Option<String>,
    /// Base fixture whose declarations are inherited.
    extends: Option<Path>,
    /// Field holding the base fixture.
    via: Option<Path>,
    /// Function returning the static default options this fixture passes on.
    defaults: Option<Path>,
}

/// A marked hook or test method.
struct Declared {
    kind: Ident,
    ident: Ident,
    shape: MethodShape,
    options: TokenStream,
}

/// Generates a `Fixture` impl for an impl block with marked methods.
pub(crate) fn generate_fixture(args: &FixtureArgs, input: &ItemImpl) -> darling::Result<TokenStream> {
    let ts = testdeck_macro_utils::resolve_crate_path(testdeck_macro_utils::TestdeckCrate::Suite);

    if let Some((_, path, _)) = &input.trait_ {
        return Err(
            darling::Error::custom("#[fixture] must be applied to an inherent impl block")
                .with_span(path),
        );
    }
    if !input.generics.params.is_empty() {
        return Err(
            darling::Error::custom("#[fixture] does not support generic impl blocks")
                .with_span(&input.generics),
        );
    }

    let self_ty = &input.self_ty;
    let fixture_name = match &args.name {
        Some(name) => name.clone(),
        None => type_name_str(self_ty)?,
    };

    // Strip markers from the original impl while collecting the marked methods
    let mut cleaned = input.clone();
    let mut declared = Vec::new();
    let mut constructor: Option<(Ident, bool)> = None;

    for item in &mut cleaned.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let markers: Vec<_> = method
            .attrs
            .iter()
            .filter_map(|attr| MethodMarker::from_attr(attr).map(|marker| (marker, attr.clone())))
            .collect();
        method
            .attrs
            .retain(|attr| MethodMarker::from_attr(attr).is_none());

        let (marker, attr) = match markers.as_slice() {
            [] => continue,
            [(marker, attr)] => (*marker, attr),
            [_, (_, second), ..] => {
                return Err(darling::Error::custom(
                    "a fixture method takes a single hook, test or constructor marker",
                )
                .with_span(second));
            }
        };

        let Some(kind) = marker.kind() else {
            if constructor.is_some() {
                return Err(
                    darling::Error::custom("a fixture has at most one #[constructor]")
                        .with_span(attr),
                );
            }
            let takes_context = validate_constructor(&method.sig)?;
            constructor = Some((method.sig.ident.clone(), takes_context));
            continue;
        };

        let shape = validate_method(marker, &method.sig)?;
        let options = marker.parse_options(attr)?.to_tokens(&ts);
        declared.push(Declared {
            kind,
            ident: method.sig.ident.clone(),
            shape,
            options,
        });
    }

    let inherit = match (&args.extends, &args.via) {
        (Some(base), Some(via)) => {
            let Some(field) = via.get_ident() else {
                return Err(
                    darling::Error::custom("`via` must name a field of the fixture").with_span(via),
                );
            };
            Some(quote! {
                fn __testdeck_base(this: &mut #self_ty) -> &mut #base {
                    &mut this.#field
                }
                declarations.inherit::<#base>(__testdeck_base)?;
            })
        }
        (Some(base), None) => {
            return Err(darling::Error::custom(
                "`extends` requires `via = <field>` naming the field holding the base fixture",
            )
            .with_span(base));
        }
        (None, Some(via)) => {
            return Err(darling::Error::custom("`via` is only meaningful with `extends`").with_span(via));
        }
        (None, None) => None,
    };

    let declare_stmts: Vec<_> = declared
        .iter()
        .map(|method| generate_declaration(&ts, self_ty, &fixture_name, method))
        .collect();

    let silence_unused = (inherit.is_none() && declare_stmts.is_empty())
        .then(|| quote! { let _ = declarations; });

    let construct = match &constructor {
        Some((ident, true)) => quote! {
            fn construct(context: &#ts::SuiteContext) -> Self {
                <#self_ty>::#ident(context)
            }
        },
        Some((ident, false)) => quote! {
            fn construct(_context: &#ts::SuiteContext) -> Self {
                <#self_ty>::#ident()
            }
        },
        None => quote! {
            fn construct(_context: &#ts::SuiteContext) -> Self {
                <#self_ty as ::core::default::Default>::default()
            }
        },
    };

    let suite_options = args.defaults.as_ref().map(|defaults| {
        quote! {
            fn suite_options() -> ::core::option::Option<#ts::TestOptions> {
                ::core::option::Option::Some(#defaults())
            }
        }
    });

    let inherited_options = args.extends.as_ref().map(|base| {
        quote! {
            fn inherited_options() -> ::core::option::Option<#ts::TestOptions> {
                #ts::static_defaults_of::<#base>()
            }
        }
    });

    Ok(quote! {
        #cleaned

        impl #ts::Fixture for #self_ty {
            const NAME: &'static str = #fixture_name;

            #construct

            fn declare(
                declarations: &mut #ts::Declarations<Self>,
            ) -> ::core::result::Result<(), #ts::SuiteError> {
                #silence_unused
                #inherit
                #(#declare_stmts)*
                ::core::result::Result::Ok(())
            }

            #suite_options

            #inherited_options
        }
    })
}

/// Emits the adapter function and `declare` call for one marked method.
fn generate_declaration(
    ts: &TokenStream,
    self_ty: &syn::Type,
    fixture_name: &str,
    method: &Declared,
) -> TokenStream {
    let Declared {
        kind,
        ident,
        shape,
        options,
    } = method;
    let method_name = ident.to_string();

    let (context_param, call) = if shape.takes_context {
        (quote!(context), quote!(<#self_ty>::#ident(this, context)))
    } else {
        (quote!(_context), quote!(<#self_ty>::#ident(this)))
    };
    let call = if shape.is_async {
        quote!(#call.await)
    } else {
        call
    };

    quote! {
        {
            fn __testdeck_method<'a>(
                this: &'a mut #self_ty,
                #context_param: &'a #ts::TestContext,
            ) -> #ts::BoxFuture<'a, #ts::TestResult> {
                ::std::boxed::Box::pin(async move {
                    #ts::IntoTestResult::into_test_result(#call)
                })
            }
            declarations.declare(
                #ts::DeclarationKind::#kind,
                #ts::MethodId::new(#fixture_name, #method_name),
                #options,
                __testdeck_method,
            )?;
        }
    }
}
