use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Difference reported for one field, list index or map key
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDiff {
    /// Left and right values side by side; `Value::Null` stands for absent
    Pair { left: Value, right: Value },
    /// Differences inside a nested record or collection
    Nested(DiffResult),
}

impl FieldDiff {
    pub fn pair(left: Value, right: Value) -> Self {
        FieldDiff::Pair { left, right }
    }

    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self {
            FieldDiff::Pair { left, right } => Some((left, right)),
            FieldDiff::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&DiffResult> {
        match self {
            FieldDiff::Nested(nested) => Some(nested),
            FieldDiff::Pair { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldDiff::Pair { left, right } => Value::Array(vec![left.clone(), right.clone()]),
            FieldDiff::Nested(nested) => nested.to_json(),
        }
    }
}

impl Serialize for FieldDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldDiff::Pair { left, right } => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(left)?;
                tuple.serialize_element(right)?;
                tuple.end()
            }
            FieldDiff::Nested(nested) => nested.serialize(serializer),
        }
    }
}

/// A leaf difference addressed by its dotted path (e.g. "items.1.name")
#[derive(Debug, Clone, PartialEq)]
pub struct LeafDiff<'a> {
    pub path: String,
    pub left: &'a Value,
    pub right: &'a Value,
}

/// Ordered mapping from field name to the difference found there.
///
/// Entries appear in the order they were inserted, which for record diffs
/// is field declaration order. Only differing fields are ever present, so an
/// empty result means the two inputs are equal under the policy used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    entries: Vec<(String, FieldDiff)>,
}

impl DiffResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any earlier entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, diff: FieldDiff) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = diff,
            None => self.entries.push((name, diff)),
        }
    }

    /// Append an entry without checking for an earlier one of the same name.
    /// Callers walking record fields, list indices or map keys already hold
    /// unique names.
    pub fn push(&mut self, name: impl Into<String>, diff: FieldDiff) {
        self.entries.push((name.into(), diff));
    }

    pub fn get(&self, name: &str) -> Option<&FieldDiff> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, diff)| diff)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDiff)> {
        self.entries.iter().map(|(name, diff)| (name.as_str(), diff))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Flatten nested entries into dotted paths, depth first, keeping order
    pub fn flatten(&self) -> Vec<LeafDiff<'_>> {
        let mut leaves = Vec::new();
        flatten_into("", self, &mut leaves);
        leaves
    }

    /// Number of leaf pairs across all nesting levels
    pub fn changed_leaves(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, diff)| match diff {
                FieldDiff::Pair { .. } => 1,
                FieldDiff::Nested(nested) => nested.changed_leaves(),
            })
            .sum()
    }

    /// Convert to a JSON object. Key order follows `serde_json::Map`, so use
    /// `serde_json::to_string` on the result itself when order matters.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, diff) in &self.entries {
            map.insert(name.clone(), diff.to_json());
        }
        Value::Object(map)
    }
}

impl IntoIterator for DiffResult {
    type Item = (String, FieldDiff);
    type IntoIter = std::vec::IntoIter<(String, FieldDiff)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for DiffResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, diff) in &self.entries {
            map.serialize_entry(name, diff)?;
        }
        map.end()
    }
}

fn flatten_into<'a>(prefix: &str, result: &'a DiffResult, output: &mut Vec<LeafDiff<'a>>) {
    for (name, diff) in &result.entries {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match diff {
            FieldDiff::Pair { left, right } => output.push(LeafDiff { path, left, right }),
            FieldDiff::Nested(nested) => flatten_into(&path, nested, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DiffResult {
        let mut inner = DiffResult::new();
        inner.insert("port", FieldDiff::pair(json!(80), json!(8080)));

        let mut items = DiffResult::new();
        items.insert("1", FieldDiff::Nested(inner));

        let mut result = DiffResult::new();
        result.insert("name", FieldDiff::pair(json!("a"), json!("b")));
        result.insert("items", FieldDiff::Nested(items));
        result
    }

    #[test]
    fn test_insertion_order() {
        let mut result = sample();
        result.insert("alpha", FieldDiff::pair(json!(1), json!(2)));
        assert_eq!(result.field_names(), vec!["name", "items", "alpha"]);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut result = DiffResult::new();
        result.insert("name", FieldDiff::pair(json!("a"), json!("b")));
        result.insert("name", FieldDiff::pair(json!("a"), json!("c")));
        assert_eq!(result.len(), 1);
        assert_eq!(
            result.get("name").and_then(FieldDiff::as_pair),
            Some((&json!("a"), &json!("c")))
        );
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut result = DiffResult::new();
        for key in ["b", "a", "c"] {
            result.push(key, FieldDiff::pair(json!(0), json!(1)));
        }
        assert_eq!(result.field_names(), vec!["b", "a", "c"]);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_serialize_preserves_order() {
        let text = serde_json::to_string(&sample()).unwrap();
        assert_eq!(text, r#"{"name":["a","b"],"items":{"1":{"port":[80,8080]}}}"#);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            sample().to_json(),
            json!({"name": ["a", "b"], "items": {"1": {"port": [80, 8080]}}})
        );
    }

    #[test]
    fn test_flatten_paths() {
        let result = sample();
        let leaves = result.flatten();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].path, "name");
        assert_eq!(leaves[1].path, "items.1.port");
        assert_eq!(leaves[1].left, &json!(80));
        assert_eq!(leaves[1].right, &json!(8080));
        assert_eq!(result.changed_leaves(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = DiffResult::new();
        assert!(result.is_empty());
        assert!(result.flatten().is_empty());
        assert_eq!(result.to_json(), json!({}));
        assert!(!result.contains("name"));
    }
}
