//! Untyped configuration documents (JSON, YAML, TOML).
//!
//! Documents have no declared fields, so shapes are classified per node at
//! runtime: `null` and missing object keys are absent, objects are records
//! over the union of both sides' keys, arrays are ordered lists and anything
//! else is a scalar.

use crate::{comparator, differ, Compare};
use confdiff_common::{ConfDiffError, DiffResult, FieldDiff, Policy, Shape};
use serde_json::{Map, Number, Value as JsonValue};
use serde_yml::Value as YamlValue;
use std::collections::BTreeSet;
use std::path::Path;

static ABSENT: JsonValue = JsonValue::Null;

/// Runtime shape of a document node
pub fn classify_value(value: &JsonValue) -> Shape {
    match value {
        JsonValue::Null => Shape::OptionalScalar,
        JsonValue::Array(_) => Shape::List,
        JsonValue::Object(_) => Shape::Record,
        JsonValue::Bool(_) | JsonValue::Number(_) | JsonValue::String(_) => Shape::Scalar,
    }
}

impl Compare for JsonValue {
    /// A document root is compared as a record
    const SHAPE: Shape = Shape::Record;

    fn equal(&self, other: &Self, policy: &Policy) -> bool {
        values_equal(self, other, policy)
    }

    fn diff(&self, other: &Self, policy: &Policy) -> Option<FieldDiff> {
        diff_values(self, other, policy)
    }

    fn to_diff_value(&self) -> JsonValue {
        self.clone()
    }
}

fn values_equal(left: &JsonValue, right: &JsonValue, policy: &Policy) -> bool {
    if classify_value(left).is_optional() || classify_value(right).is_optional() {
        return match (left, right) {
            (JsonValue::Null, JsonValue::Null) => true,
            (JsonValue::Null, present) | (present, JsonValue::Null) => {
                policy.treat_absent_as_empty && is_empty_value(present)
            }
            _ => false,
        };
    }

    match (left, right) {
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a == b,
        (JsonValue::Number(a), JsonValue::Number(b)) => numbers_equal(a, b),
        (JsonValue::String(a), JsonValue::String(b)) => a == b,
        (JsonValue::Array(a), JsonValue::Array(b)) => comparator::equal_list(a, b, policy),
        (JsonValue::Object(a), JsonValue::Object(b)) => union_keys(a, b)
            .into_iter()
            .all(|key| values_equal(member(a, key), member(b, key), policy)),
        _ => false,
    }
}

fn diff_values(left: &JsonValue, right: &JsonValue, policy: &Policy) -> Option<FieldDiff> {
    match (left, right) {
        (JsonValue::Array(a), JsonValue::Array(b)) => differ::diff_list(a, b, policy),
        (JsonValue::Object(a), JsonValue::Object(b)) => {
            let nested = diff_objects(a, b, policy);
            if nested.is_empty() {
                None
            } else {
                Some(FieldDiff::Nested(nested))
            }
        }
        _ if values_equal(left, right, policy) => None,
        (JsonValue::Null, present) => Some(FieldDiff::pair(
            absent_value(present, policy),
            present.clone(),
        )),
        (present, JsonValue::Null) => Some(FieldDiff::pair(
            present.clone(),
            absent_value(present, policy),
        )),
        _ => Some(FieldDiff::pair(left.clone(), right.clone())),
    }
}

fn diff_objects(
    left: &Map<String, JsonValue>,
    right: &Map<String, JsonValue>,
    policy: &Policy,
) -> DiffResult {
    let mut result = DiffResult::new();
    for key in union_keys(left, right) {
        differ::diff_field(&mut result, key, member(left, key), member(right, key), policy);
    }
    result
}

fn union_keys<'a>(
    left: &'a Map<String, JsonValue>,
    right: &'a Map<String, JsonValue>,
) -> BTreeSet<&'a str> {
    left.keys().chain(right.keys()).map(String::as_str).collect()
}

fn member<'a>(map: &'a Map<String, JsonValue>, key: &str) -> &'a JsonValue {
    map.get(key).unwrap_or(&ABSENT)
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        a == b
    } else if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        a == b
    } else if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        comparator::equal_f64(a, b)
    } else {
        false
    }
}

/// Whether a node equals the empty value of its kind
pub fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.values().all(is_empty_value),
    }
}

/// Display form of an absent node next to `present`
fn absent_value(present: &JsonValue, policy: &Policy) -> JsonValue {
    if !policy.treat_absent_as_empty {
        return JsonValue::Null;
    }
    match present {
        JsonValue::Null => JsonValue::Null,
        JsonValue::Bool(_) => JsonValue::Bool(false),
        JsonValue::Number(_) => JsonValue::from(0),
        JsonValue::String(_) => JsonValue::String(String::new()),
        JsonValue::Array(_) => JsonValue::Array(Vec::new()),
        JsonValue::Object(_) => JsonValue::Object(Map::new()),
    }
}

/// Remove every object member named in `names`, at any depth
pub fn strip_identity_fields(value: &mut JsonValue, names: &[String]) {
    match value {
        JsonValue::Object(map) => {
            for name in names {
                map.remove(name);
            }
            for member in map.values_mut() {
                strip_identity_fields(member, names);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                strip_identity_fields(item, names);
            }
        }
        _ => {}
    }
}

/// Load a JSON, YAML or TOML document, chosen by file extension.
/// Unknown extensions are parsed as JSON.
pub fn load_document(path: &Path) -> Result<JsonValue, ConfDiffError> {
    let content = std::fs::read_to_string(path)?;
    let parse_error = |message: String| ConfDiffError::Parse {
        path: path.display().to_string(),
        message,
    };

    if is_yaml_file(path) {
        let yaml: YamlValue =
            serde_yml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
        Ok(yaml_to_json(yaml))
    } else if is_toml_file(path) {
        let toml: toml::Value = toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
        Ok(toml_to_json(toml))
    } else {
        serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
    }
}

/// Convert YAML value to JSON value
fn yaml_to_json(yaml: YamlValue) -> JsonValue {
    match yaml {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else if let Some(f) = n.as_f64() {
                JsonValue::from(f)
            } else {
                JsonValue::Null
            }
        }
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(seq) => JsonValue::Array(seq.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(map) => {
            let mut obj = Map::new();
            for (k, v) in map {
                let key = match k {
                    YamlValue::String(key) => key,
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    // Non-scalar keys have no natural string form
                    other => format!("{:?}", other),
                };
                obj.insert(key, yaml_to_json(v));
            }
            JsonValue::Object(obj)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

/// Convert TOML value to JSON value; datetimes become their string form
fn toml_to_json(toml: toml::Value) -> JsonValue {
    match toml {
        toml::Value::String(s) => JsonValue::String(s),
        toml::Value::Integer(i) => JsonValue::from(i),
        toml::Value::Float(f) => JsonValue::from(f),
        toml::Value::Boolean(b) => JsonValue::Bool(b),
        toml::Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        toml::Value::Array(items) => JsonValue::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

/// Check if a file path appears to be JSON based on extension
pub fn is_json_file(path: &Path) -> bool {
    has_extension(path, &["json", "jsonc", "json5"])
}

/// Check if a file path appears to be YAML based on extension
pub fn is_yaml_file(path: &Path) -> bool {
    has_extension(path, &["yaml", "yml"])
}

/// Check if a file path appears to be TOML based on extension
pub fn is_toml_file(path: &Path) -> bool {
    has_extension(path, &["toml"])
}

fn has_extension(path: &Path, candidates: &[&str]) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            candidates.contains(&ext.as_str())
        }
        None => false,
    }
}
