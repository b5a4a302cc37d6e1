use crate::Compare;
use confdiff_common::{DiffResult, FieldDescriptor, Policy};

/// A named, ordered set of fields, usually implemented with
/// `#[derive(Record)]`.
///
/// ```
/// use confdiff_core::{diff, equal, Policy, Record};
///
/// #[derive(Default, Record)]
/// struct Acl {
///     #[compare(identity)]
///     index: i64,
///     acl_name: String,
///     value: Option<String>,
/// }
///
/// let left = Acl { index: 0, acl_name: "is_api".into(), value: None };
/// let right = Acl { index: 3, acl_name: "is_api".into(), value: Some(String::new()) };
///
/// assert!(!equal(&left, &right, &Policy::default()));
/// assert!(equal(&left, &right, &Policy::lenient()));
/// assert_eq!(diff(&left, &right, &Policy::default()).field_names(), ["index", "value"]);
/// ```
pub trait Record: Compare {
    /// Type name, used in logs
    const NAME: &'static str;

    /// Name of the field that only marks position or identity, if any
    const IDENTITY_FIELD: Option<&'static str>;

    /// Declared fields in declaration order
    const FIELDS: &'static [FieldDescriptor];

    /// Field-by-field equality, honouring the identity switch
    fn equal_fields(&self, other: &Self, policy: &Policy) -> bool;

    /// Field-by-field diff in declaration order, honouring the identity switch
    fn diff_fields(&self, other: &Self, policy: &Policy) -> DiffResult;

    /// Fields that take part in comparison under `policy`
    fn compared_fields(policy: &Policy) -> Vec<&'static FieldDescriptor> {
        Self::FIELDS
            .iter()
            .filter(|field| !(field.identity && policy.ignore_identity_field))
            .collect()
    }
}
