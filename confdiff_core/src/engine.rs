use crate::document::{load_document, strip_identity_fields};
use crate::{comparator, differ, Compare, Record};
use confdiff_common::{AppConfig, ConfDiffError, DiffResult, FieldDiff, Policy};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Key under which a difference at the very root of a document is reported
pub const ROOT_KEY: &str = "root";

/// Outcome of comparing two documents
#[derive(Debug, Clone, Serialize)]
pub struct DocumentComparison {
    /// Whether the documents are equal under the engine's policy
    pub equal: bool,
    /// Number of differing leaf paths
    pub changed_paths: usize,
    /// Structured differences
    pub diff: DiffResult,
}

/// Engine binding a comparison policy to typed records and documents
#[derive(Debug, Clone)]
pub struct DiffEngine {
    policy: Policy,
    identity_fields: Vec<String>,
}

impl DiffEngine {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            identity_fields: AppConfig::default().identity_fields,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            policy: config.policy,
            identity_fields: config.identity_fields.clone(),
        }
    }

    /// Object keys stripped from documents when identity fields are ignored
    pub fn with_identity_fields(mut self, fields: Vec<String>) -> Self {
        self.identity_fields = fields;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn identity_fields(&self) -> &[String] {
        &self.identity_fields
    }

    /// Compare two typed records
    pub fn equal<R: Record>(&self, left: &R, right: &R) -> bool {
        comparator::equal(left, right, &self.policy)
    }

    /// Diff two typed records
    pub fn diff<R: Record>(&self, left: &R, right: &R) -> DiffResult {
        debug!(
            "Diffing {} over {} of {} fields",
            R::NAME,
            R::compared_fields(&self.policy).len(),
            R::FIELDS.len()
        );
        differ::diff(left, right, &self.policy)
    }

    /// Compare two untyped documents
    pub fn compare_values(&self, mut left: Value, mut right: Value) -> DocumentComparison {
        if self.policy.ignore_identity_field && !self.identity_fields.is_empty() {
            strip_identity_fields(&mut left, &self.identity_fields);
            strip_identity_fields(&mut right, &self.identity_fields);
        }

        let equal = left.equal(&right, &self.policy);
        let diff = match left.diff(&right, &self.policy) {
            None => DiffResult::new(),
            Some(FieldDiff::Nested(nested)) => nested,
            Some(pair @ FieldDiff::Pair { .. }) => {
                let mut result = DiffResult::new();
                result.insert(ROOT_KEY, pair);
                result
            }
        };
        let changed_paths = diff.changed_leaves();

        debug!("Document comparison: equal={}, {} changed paths", equal, changed_paths);

        DocumentComparison {
            equal,
            changed_paths,
            diff,
        }
    }

    /// Load and compare two documents from disk
    pub fn compare_files(
        &self,
        left: &Path,
        right: &Path,
    ) -> Result<DocumentComparison, ConfDiffError> {
        info!("Comparing {} with {}", left.display(), right.display());
        let left_doc = load_document(left)?;
        let right_doc = load_document(right)?;
        Ok(self.compare_values(left_doc, right_doc))
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}
