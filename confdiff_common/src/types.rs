use serde::{Deserialize, Serialize};

/// Structural category of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Primitive comparable value (string, number, bool, date/time)
    Scalar,
    /// Scalar that may be explicitly absent
    OptionalScalar,
    /// Ordered sequence where position is significant
    List,
    /// String-keyed collection where order is not significant
    Map,
    /// Nested record compared field by field
    Record,
    /// Nested record that may be explicitly absent
    OptionalRecord,
}

impl Shape {
    /// Whether an absent value is representable for this shape
    pub const fn is_optional(self) -> bool {
        matches!(self, Shape::OptionalScalar | Shape::OptionalRecord)
    }

    /// Whether values of this shape hold other values
    pub const fn is_collection(self) -> bool {
        matches!(self, Shape::List | Shape::Map)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::OptionalScalar => "optional scalar",
            Shape::List => "list",
            Shape::Map => "map",
            Shape::Record => "record",
            Shape::OptionalRecord => "optional record",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a differing list or map field is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionDiff {
    /// Nested mapping keyed by index or key, only for differing members
    #[default]
    Elementwise,
    /// Whole collections as a single pair whenever any member differs
    Whole,
}

/// Comparison policy shared by every equal/diff call.
///
/// Policies are plain values: callers build one, pass it by reference into
/// the engine and may reuse it across calls and threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// An absent optional equals the empty value of its shape, provided the
    /// other side's value is itself empty
    pub treat_absent_as_empty: bool,

    /// Exclude the record's designated identity field from equal and diff
    pub ignore_identity_field: bool,

    /// Reporting mode for differing lists and maps
    pub collection_diff: CollectionDiff,
}

impl Policy {
    pub const fn new() -> Self {
        Self {
            treat_absent_as_empty: false,
            ignore_identity_field: false,
            collection_diff: CollectionDiff::Elementwise,
        }
    }

    /// Both switches on
    pub const fn lenient() -> Self {
        Self {
            treat_absent_as_empty: true,
            ignore_identity_field: true,
            collection_diff: CollectionDiff::Elementwise,
        }
    }

    pub const fn with_absent_as_empty(mut self, enabled: bool) -> Self {
        self.treat_absent_as_empty = enabled;
        self
    }

    pub const fn with_ignored_identity(mut self, enabled: bool) -> Self {
        self.ignore_identity_field = enabled;
        self
    }

    pub const fn with_collection_diff(mut self, mode: CollectionDiff) -> Self {
        self.collection_diff = mode;
        self
    }
}

/// Declared name and shape of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub shape: Shape,
    pub identity: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            identity: false,
        }
    }

    pub const fn identity(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            identity: true,
        }
    }
}

fn default_identity_fields() -> Vec<String> {
    vec![String::from("index")]
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Object keys treated as identity markers in untyped documents
    #[serde(default = "default_identity_fields")]
    pub identity_fields: Vec<String>,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,

    /// Default comparison policy
    #[serde(default)]
    pub policy: Policy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identity_fields: default_identity_fields(),
            portable_mode: false,
            policy: Policy::default(),
        }
    }
}
