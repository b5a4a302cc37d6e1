//! Value classification.
//!
//! Every comparable type declares its [`Shape`] statically through
//! [`Compare::SHAPE`]; the equal/diff behaviour for that shape is supplied by
//! the comparator and differ modules.

use crate::{comparator, differ};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use confdiff_common::{FieldDiff, Policy, Shape};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::BuildHasher;

/// A value that can be structurally compared and diffed.
pub trait Compare {
    /// Structural category of this type
    const SHAPE: Shape;

    /// Structural equality under `policy`
    fn equal(&self, other: &Self, policy: &Policy) -> bool;

    /// Difference between `self` (left) and `other` (right), or `None` when
    /// they are equal under `policy`
    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        if self.equal(other, policy) {
            None
        } else {
            Some(FieldDiff::pair(self.to_diff_value(), other.to_diff_value()))
        }
    }

    /// Display form used in diff pairs
    fn to_diff_value(&self) -> Value;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Compare for $ty {
                const SHAPE: Shape = Shape::Scalar;

                fn equal(&self, other: &Self, _policy: &Policy) -> bool {
                    self == other
                }

                fn to_diff_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_scalar!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Compare for String {
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        self == other
    }

    fn to_diff_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Compare for char {
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        self == other
    }

    fn to_diff_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Compare for f64 {
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        comparator::equal_f64(*self, *other)
    }

    fn to_diff_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Compare for f32 {
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        comparator::equal_f32(*self, *other)
    }

    fn to_diff_value(&self) -> Value {
        Value::from(*self)
    }
}

// Date/times compare as instants, whatever offset they were parsed with.
impl<Tz: TimeZone> Compare for DateTime<Tz>
where
    Tz::Offset: Display,
{
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        self.timestamp() == other.timestamp()
            && self.timestamp_subsec_nanos() == other.timestamp_subsec_nanos()
    }

    fn to_diff_value(&self) -> Value {
        Value::String(self.to_rfc3339())
    }
}

impl Compare for NaiveDateTime {
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        self == other
    }

    fn to_diff_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Compare for NaiveDate {
    const SHAPE: Shape = Shape::Scalar;

    fn equal(&self, other: &Self, _policy: &Policy) -> bool {
        self == other
    }

    fn to_diff_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: Compare> Compare for Box<T> {
    const SHAPE: Shape = T::SHAPE;

    fn equal(&self, other: &Self, policy: &Policy) -> bool {
        (**self).equal(other, policy)
    }

    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        (**self).diff(other, policy)
    }

    fn to_diff_value(&self) -> Value {
        (**self).to_diff_value()
    }
}

/// `Default` supplies the empty value substituted for an absent side.
impl<T: Compare + Default> Compare for Option<T> {
    const SHAPE: Shape = match T::SHAPE {
        Shape::Record | Shape::OptionalRecord => Shape::OptionalRecord,
        _ => Shape::OptionalScalar,
    };

    fn equal(&self, other: &Self, policy: &Policy) -> bool {
        comparator::equal_optional(self.as_ref(), other.as_ref(), policy)
    }

    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        differ::diff_optional(self.as_ref(), other.as_ref(), policy)
    }

    fn to_diff_value(&self) -> Value {
        match self {
            Some(value) => value.to_diff_value(),
            None => Value::Null,
        }
    }
}

impl<T: Compare> Compare for Vec<T> {
    const SHAPE: Shape = Shape::List;

    fn equal(&self, other: &Self, policy: &Policy) -> bool {
        comparator::equal_list(self, other, policy)
    }

    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        differ::diff_list(self, other, policy)
    }

    fn to_diff_value(&self) -> Value {
        Value::Array(self.iter().map(Compare::to_diff_value).collect())
    }
}

/// Read access shared by the string-keyed map types.
pub trait KeyedCollection {
    type Item: Compare;

    fn member_count(&self) -> usize;

    fn lookup(&self, key: &str) -> Option<&Self::Item>;

    /// Entries in ascending key order
    fn sorted_entries(&self) -> Vec<(&str, &Self::Item)>;

    fn to_object(&self) -> Value {
        let map = self
            .sorted_entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_diff_value()))
            .collect();
        Value::Object(map)
    }
}

impl<T: Compare> KeyedCollection for BTreeMap<String, T> {
    type Item = T;

    fn member_count(&self) -> usize {
        self.len()
    }

    fn lookup(&self, key: &str) -> Option<&T> {
        self.get(key)
    }

    fn sorted_entries(&self) -> Vec<(&str, &T)> {
        self.iter().map(|(key, value)| (key.as_str(), value)).collect()
    }
}

impl<T: Compare, S: BuildHasher> KeyedCollection for HashMap<String, T, S> {
    type Item = T;

    fn member_count(&self) -> usize {
        self.len()
    }

    fn lookup(&self, key: &str) -> Option<&T> {
        self.get(key)
    }

    fn sorted_entries(&self) -> Vec<(&str, &T)> {
        let mut entries: Vec<_> = self.iter().map(|(key, value)| (key.as_str(), value)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<T: Compare> Compare for BTreeMap<String, T> {
    const SHAPE: Shape = Shape::Map;

    fn equal(&self, other: &Self, policy: &Policy) -> bool {
        comparator::equal_map(self, other, policy)
    }

    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        differ::diff_map(self, other, policy)
    }

    fn to_diff_value(&self) -> Value {
        self.to_object()
    }
}

impl<T: Compare, S: BuildHasher> Compare for HashMap<String, T, S> {
    const SHAPE: Shape = Shape::Map;

    fn equal(&self, other: &Self, policy: &Policy) -> bool {
        comparator::equal_map(self, other, policy)
    }

    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        differ::diff_map(self, other, policy)
    }

    fn to_diff_value(&self) -> Value {
        self.to_object()
    }
}
