//! Derive macro for configuration records.
//!
//! `#[derive(Record)]` enumerates a struct's named fields and emits calls
//! into `confdiff_core`; all comparison logic stays in the engine.
//!
//! Field attributes:
//! - `#[compare(identity)]` marks the positional identity field, skipped when
//!   the policy ignores identity fields. At most one per record.
//! - `#[compare(rename = "name")]` sets the name used in diff output.

use proc_macro::TokenStream;

mod record;
mod utils;

#[proc_macro_derive(Record, attributes(compare))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
