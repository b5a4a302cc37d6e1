//! Record derive macro implementation.
//!
//! Generates `Compare` and `Record` implementations that walk the struct's
//! fields in declaration order and delegate each one to the engine.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Ident, LitStr, Type};

use crate::utils::{parse_field_options, unraw, validate_struct_with_named_fields};

struct RecordField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    name: LitStr,
    identity: bool,
}

/// Main entry point for the Record derive macro.
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_record_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = LitStr::new(&unraw(name), name.span());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = collect_fields(input)?;

    let identity = match fields.iter().find(|f| f.identity) {
        Some(field) => {
            let lit = &field.name;
            quote! { ::core::option::Option::Some(#lit) }
        }
        None => quote! { ::core::option::Option::None },
    };

    let descriptors = fields.iter().map(|field| {
        let lit = &field.name;
        let ty = field.ty;
        if field.identity {
            quote! {
                ::confdiff_core::FieldDescriptor::identity(#lit, <#ty as ::confdiff_core::Compare>::SHAPE)
            }
        } else {
            quote! {
                ::confdiff_core::FieldDescriptor::new(#lit, <#ty as ::confdiff_core::Compare>::SHAPE)
            }
        }
    });

    let equal_checks = fields.iter().map(|field| {
        let ident = field.ident;
        let check = quote! {
            ::confdiff_core::Compare::equal(&self.#ident, &other.#ident, policy)
        };
        if field.identity {
            quote! {
                if !policy.ignore_identity_field && !#check {
                    return false;
                }
            }
        } else {
            quote! {
                if !#check {
                    return false;
                }
            }
        }
    });

    let diff_calls = fields.iter().map(|field| {
        let ident = field.ident;
        let lit = &field.name;
        let call = quote! {
            ::confdiff_core::differ::diff_field(&mut result, #lit, &self.#ident, &other.#ident, policy);
        };
        if field.identity {
            quote! {
                if !policy.ignore_identity_field {
                    #call
                }
            }
        } else {
            call
        }
    });

    let display_inserts = fields.iter().map(|field| {
        let ident = field.ident;
        let lit = &field.name;
        quote! {
            map.insert(
                ::std::string::String::from(#lit),
                ::confdiff_core::Compare::to_diff_value(&self.#ident),
            );
        }
    });

    Ok(quote! {
        impl #impl_generics ::confdiff_core::Compare for #name #ty_generics #where_clause {
            const SHAPE: ::confdiff_core::Shape = ::confdiff_core::Shape::Record;

            fn equal(&self, other: &Self, policy: &::confdiff_core::Policy) -> bool {
                <Self as ::confdiff_core::Record>::equal_fields(self, other, policy)
            }

            fn diff(
                &self,
                other: &Self,
                policy: &::confdiff_core::Policy,
            ) -> ::core::option::Option<::confdiff_core::FieldDiff> {
                ::confdiff_core::differ::diff_nested(self, other, policy)
            }

            fn to_diff_value(&self) -> ::confdiff_core::serde_json::Value {
                #[allow(unused_mut)]
                let mut map = ::confdiff_core::serde_json::Map::new();
                #(#display_inserts)*
                ::confdiff_core::serde_json::Value::Object(map)
            }
        }

        impl #impl_generics ::confdiff_core::Record for #name #ty_generics #where_clause {
            const NAME: &'static str = #name_str;
            const IDENTITY_FIELD: ::core::option::Option<&'static str> = #identity;
            const FIELDS: &'static [::confdiff_core::FieldDescriptor] = &[#(#descriptors),*];

            #[allow(unused_variables)]
            fn equal_fields(&self, other: &Self, policy: &::confdiff_core::Policy) -> bool {
                #(#equal_checks)*
                true
            }

            #[allow(unused_variables)]
            fn diff_fields(
                &self,
                other: &Self,
                policy: &::confdiff_core::Policy,
            ) -> ::confdiff_core::DiffResult {
                #[allow(unused_mut)]
                let mut result = ::confdiff_core::DiffResult::new();
                #(#diff_calls)*
                result
            }
        }
    })
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<RecordField<'_>>> {
    let named = validate_struct_with_named_fields(input, "Record")?;
    let mut fields = Vec::with_capacity(named.len());
    let mut seen_identity: Option<&Ident> = None;

    for field in named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let options = parse_field_options(field)?;

        if options.identity {
            if let Some(previous) = seen_identity {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!("only one identity field is allowed, `{previous}` is already marked"),
                ));
            }
            seen_identity = Some(ident);
        }

        let name = options
            .rename
            .unwrap_or_else(|| LitStr::new(&unraw(ident), ident.span()));

        fields.push(RecordField {
            ident,
            ty: &field.ty,
            name,
            identity: options.identity,
        });
    }

    Ok(fields)
}
