//! Shared helpers for the record derive.

use syn::{punctuated::Punctuated, token::Comma, Data, DeriveInput, Field, Fields, LitStr};

/// Validate that the input is a struct with named fields, returning the fields.
pub fn validate_struct_with_named_fields<'a>(
    input: &'a DeriveInput,
    macro_name: &str,
) -> syn::Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{macro_name} derive only supports structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{macro_name} derive only supports structs"),
        )),
    }
}

/// Options parsed from `#[compare(...)]` on a single field.
#[derive(Default)]
pub struct FieldOptions {
    pub identity: bool,
    pub rename: Option<LitStr>,
}

pub fn parse_field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("compare") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("identity") {
                options.identity = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `identity` or `rename = \"...\"`"))
            }
        })?;
    }

    Ok(options)
}

/// Strip the raw identifier prefix so `r#type` reports as `type`.
pub fn unraw(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}
