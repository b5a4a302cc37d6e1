//! Structural diff, one rule per shape.
//!
//! Every function here returns `None` (or an empty result) exactly when the
//! comparator reports equality under the same policy.

use crate::comparator::{equal_optional, same_keys};
use crate::{Compare, KeyedCollection, Record};
use confdiff_common::{CollectionDiff, DiffResult, FieldDiff, Policy};
use serde_json::Value;
use tracing::debug;

/// Diff two records field by field, in declaration order
pub fn diff<R: Record>(left: &R, right: &R, policy: &Policy) -> DiffResult {
    let result = left.diff_fields(right, policy);
    debug!("{} diff: {} differing fields", R::NAME, result.len());
    result
}

/// Record the difference for one field, if any, under `name`.
/// `name` must not already be present in `result`.
pub fn diff_field<T: Compare>(
    result: &mut DiffResult,
    name: &str,
    left: &T,
    right: &T,
    policy: &Policy,
) {
    if let Some(diff) = left.diff(right, policy) {
        result.push(name, diff);
    }
}

/// Nested record: its sub-diff, or `None` when every differing sub-field was
/// filtered out by the policy
pub fn diff_nested<R: Record>(left: &R, right: &R, policy: &Policy) -> Option<FieldDiff> {
    let nested = left.diff_fields(right, policy);
    if nested.is_empty() {
        None
    } else {
        Some(FieldDiff::Nested(nested))
    }
}

/// Optional values. An absent side shows as the empty value when
/// absent-as-empty is on, otherwise as `null`. When both sides are present
/// the field is still reported as one pair, whatever the inner shape.
pub fn diff_optional<T: Compare + Default>(
    left: Option<&T>,
    right: Option<&T>,
    policy: &Policy,
) -> Option<FieldDiff> {
    if equal_optional(left, right, policy) {
        return None;
    }

    match (left, right) {
        (Some(left), Some(right)) => {
            Some(FieldDiff::pair(left.to_diff_value(), right.to_diff_value()))
        }
        (Some(present), None) => Some(FieldDiff::pair(
            present.to_diff_value(),
            absent_value::<T>(policy),
        )),
        (None, Some(present)) => Some(FieldDiff::pair(
            absent_value::<T>(policy),
            present.to_diff_value(),
        )),
        (None, None) => None,
    }
}

fn absent_value<T: Compare + Default>(policy: &Policy) -> Value {
    if policy.treat_absent_as_empty {
        T::default().to_diff_value()
    } else {
        Value::Null
    }
}

/// Ordered lists. A length mismatch is reported as the two whole lists;
/// otherwise only differing positions appear, keyed by index.
pub fn diff_list<T: Compare>(left: &[T], right: &[T], policy: &Policy) -> Option<FieldDiff> {
    if left.len() != right.len() {
        return Some(FieldDiff::pair(list_value(left), list_value(right)));
    }

    let mut nested = DiffResult::new();
    for (index, (left, right)) in left.iter().zip(right).enumerate() {
        diff_field(&mut nested, &index.to_string(), left, right, policy);
    }

    collection_result(nested, policy, || {
        FieldDiff::pair(list_value(left), list_value(right))
    })
}

/// Keyed collections. Differing key sets are reported as the two whole
/// collections; otherwise only differing keys appear, in key order.
pub fn diff_map<M: KeyedCollection>(left: &M, right: &M, policy: &Policy) -> Option<FieldDiff> {
    if !same_keys(left, right) {
        return Some(FieldDiff::pair(left.to_object(), right.to_object()));
    }

    let mut nested = DiffResult::new();
    for (key, value) in left.sorted_entries() {
        if let Some(other) = right.lookup(key) {
            diff_field(&mut nested, key, value, other, policy);
        }
    }

    collection_result(nested, policy, || {
        FieldDiff::pair(left.to_object(), right.to_object())
    })
}

fn collection_result(
    nested: DiffResult,
    policy: &Policy,
    whole: impl FnOnce() -> FieldDiff,
) -> Option<FieldDiff> {
    if nested.is_empty() {
        return None;
    }

    match policy.collection_diff {
        CollectionDiff::Elementwise => Some(FieldDiff::Nested(nested)),
        CollectionDiff::Whole => Some(whole()),
    }
}

fn list_value<T: Compare>(items: &[T]) -> Value {
    Value::Array(items.iter().map(Compare::to_diff_value).collect())
}
