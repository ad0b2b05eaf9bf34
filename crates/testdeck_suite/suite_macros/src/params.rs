//! Derive macro for the `Parameterized` trait.

use darling::{FromDeriveInput, FromField, FromMeta, ast::Data, util::Ignored};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, DeriveInput, Meta};

/// Parsed input of the derive.
#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct ParameterizedInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, ParamField>,
}

/// A struct field, with its `#[param]` attributes forwarded.
#[derive(FromField)]
#[darling(forward_attrs(param))]
struct ParamField {
    ident: Option<syn::Ident>,
    attrs: Vec<Attribute>,
}

/// Arguments of `#[param(...)]`.
#[derive(Debug, Default, FromMeta)]
struct ParamArgs {
    /// Property name, defaulting to the field name.
    rename: Option<String>,
}

fn parse_param(attr: &Attribute) -> darling::Result<ParamArgs> {
    match &attr.meta {
        Meta::Path(_) => Ok(ParamArgs::default()),
        meta => ParamArgs::from_meta(meta),
    }
}

/// Implementation of `#[derive(Parameterized)]`.
///
/// Every field marked `#[param]` becomes an assignable property, deserialized
/// from the run's JSON value.
pub(crate) fn derive_parameterized(input: &DeriveInput) -> darling::Result<TokenStream> {
    let input = ParameterizedInput::from_derive_input(input)?;
    let ts = testdeck_macro_utils::resolve_crate_path(testdeck_macro_utils::TestdeckCrate::Suite);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(fields) = &input.data else {
        return Err(darling::Error::custom("#[derive(Parameterized)] requires a struct with named fields")
            .with_span(name));
    };

    let mut properties = Vec::new();
    let mut arms = Vec::new();
    for field in fields.iter() {
        let Some(attr) = field.attrs.first() else {
            continue;
        };
        let Some(ident) = &field.ident else {
            continue;
        };

        let property = parse_param(attr)?
            .rename
            .unwrap_or_else(|| ident.to_string());
        if properties.contains(&property) {
            return Err(
                darling::Error::custom(format!("property `{property}` is declared twice"))
                    .with_span(attr),
            );
        }

        arms.push(quote! {
            #property => {
                self.#ident = #ts::__private::serde_json::from_value(value)
                    .map_err(|source| #ts::ParamError::deserialize(property, source))?;
                ::core::result::Result::Ok(())
            }
        });
        properties.push(property);
    }

    Ok(quote! {
        impl #impl_generics #ts::Parameterized for #name #ty_generics #where_clause {
            const PROPERTIES: &'static [&'static str] = &[#(#properties),*];

            fn assign(
                &mut self,
                property: &str,
                value: #ts::__private::serde_json::Value,
            ) -> ::core::result::Result<(), #ts::ParamError> {
                match property {
                    #(#arms)*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err(#ts::ParamError::unknown(property))
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn only_marked_fields_become_properties() {
        let input: DeriveInput = parse_quote! {
            struct Sizes {
                #[param]
                width: u32,
                #[param(rename = "caption")]
                label: String,
                scratch: Vec<u8>,
            }
        };
        let output = derive_parameterized(&input).unwrap().to_string();

        assert!(output.contains("& [\"width\" , \"caption\"]"));
        assert!(output.contains("self . label ="));
        assert!(!output.contains("scratch"));
    }

    #[test]
    fn rejects_duplicate_property_names() {
        let input: DeriveInput = parse_quote! {
            struct Clash {
                #[param]
                width: u32,
                #[param(rename = "width")]
                other: u32,
            }
        };
        let err = derive_parameterized(&input).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Choice { A, B }
        };
        assert!(derive_parameterized(&input).is_err());
    }
}
