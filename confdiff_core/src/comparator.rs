//! Structural equality, one rule per shape.

use crate::{Compare, KeyedCollection, Record};
use confdiff_common::Policy;
use tracing::trace;

/// Compare two records under `policy`
pub fn equal<R: Record>(left: &R, right: &R, policy: &Policy) -> bool {
    let same = left.equal_fields(right, policy);
    trace!("{} records equal: {}", R::NAME, same);
    same
}

/// Optional values: both absent are equal; a single absent side equals the
/// present one only when absent-as-empty is on and the present value is
/// itself the empty value of its type.
pub fn equal_optional<T: Compare + Default>(
    left: Option<&T>,
    right: Option<&T>,
    policy: &Policy,
) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => left.equal(right, policy),
        (Some(present), None) | (None, Some(present)) => {
            policy.treat_absent_as_empty && present.equal(&T::default(), policy)
        }
    }
}

/// Ordered lists: equal length and pairwise equal elements
pub fn equal_list<T: Compare>(left: &[T], right: &[T], policy: &Policy) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(left, right)| left.equal(right, policy))
}

/// Keyed collections: identical key sets and equal values per key.
///
/// Membership is never relaxed by absent-as-empty; a key missing on one side
/// always fails.
pub fn equal_map<M: KeyedCollection>(left: &M, right: &M, policy: &Policy) -> bool {
    if left.member_count() != right.member_count() {
        return false;
    }

    left.sorted_entries().into_iter().all(|(key, value)| {
        right
            .lookup(key)
            .map_or(false, |other| value.equal(other, policy))
    })
}

/// Whether both maps hold exactly the same keys
pub fn same_keys<M: KeyedCollection>(left: &M, right: &M) -> bool {
    left.member_count() == right.member_count()
        && left
            .sorted_entries()
            .into_iter()
            .all(|(key, _)| right.lookup(key).is_some())
}

pub fn equal_f64(left: f64, right: f64) -> bool {
    left == right || (left - right).abs() < f64::EPSILON || (left.is_nan() && right.is_nan())
}

pub fn equal_f32(left: f32, right: f32) -> bool {
    left == right || (left - right).abs() < f32::EPSILON || (left.is_nan() && right.is_nan())
}
