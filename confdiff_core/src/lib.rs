//! Structural equality and diff for configuration records.
//!
//! Records derive [`Record`]; every field is classified into a [`Shape`] by
//! its type's [`Compare`] implementation, and one recursive algorithm per
//! operation handles every shape under a caller-supplied [`Policy`].

extern crate self as confdiff_core;

pub mod classifier;
pub mod comparator;
pub mod differ;
pub mod document;
pub mod engine;
pub mod record;

pub use classifier::{Compare, KeyedCollection};
pub use comparator::equal;
pub use differ::diff;
pub use document::{classify_value, load_document};
pub use engine::{DiffEngine, DocumentComparison};
pub use record::Record;

pub use confdiff_common::{
    CollectionDiff, ConfDiffError, DiffResult, FieldDescriptor, FieldDiff, LeafDiff, Policy, Shape,
};
pub use confdiff_derive::Record;

#[doc(hidden)]
pub use serde_json;
