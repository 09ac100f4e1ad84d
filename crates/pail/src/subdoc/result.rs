// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde_json::Value;

use crate::Cas;

/// Per-path outcome of a sub-document operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FieldStatus {
    /// The operation succeeded.
    Success,
    /// The path does not exist.
    PathNotFound,
    /// The path already exists.
    PathExists,
    /// The path points at a value of the wrong type.
    PathMismatch,
    /// The counter would overflow or the delta is invalid.
    DeltaInvalid,
    /// Any other per-path failure.
    Other,
}

/// The result of one declared operation record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResult {
    path: String,
    status: FieldStatus,
    value: Option<Value>,
}

impl FieldResult {
    /// Creates a field result.
    #[must_use]
    pub fn new(path: impl Into<String>, status: FieldStatus, value: Option<Value>) -> Self {
        Self {
            path: path.into(),
            status,
            value,
        }
    }

    /// The path of the operation record.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The per-path outcome.
    #[must_use]
    pub fn status(&self) -> FieldStatus {
        self.status
    }

    /// The returned value, if the operation produced one.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// The result of a batched sub-document request.
///
/// Fields appear in the order the operation records were declared.
///
/// ```
/// use pail::{Cas, FieldResult, FieldStatus, MultiResult};
/// use serde_json::json;
///
/// let result = MultiResult::new(
///     Cas::new(7),
///     vec![
///         FieldResult::new("name", FieldStatus::Success, Some(json!("pail"))),
///         FieldResult::new("missing", FieldStatus::PathNotFound, None),
///     ],
/// );
///
/// assert_eq!(result.content_at(0), Some(&json!("pail")));
/// assert!(result.exists_at(0));
/// assert!(!result.exists_at(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MultiResult {
    cas: Cas,
    fields: Vec<FieldResult>,
}

impl MultiResult {
    /// Creates a result.
    #[must_use]
    pub fn new(cas: Cas, fields: Vec<FieldResult>) -> Self {
        Self { cas, fields }
    }

    /// The CAS value of the document.
    #[must_use]
    pub fn cas(&self) -> Cas {
        self.cas
    }

    /// Returns the field at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FieldResult> {
        self.fields.get(index)
    }

    /// Returns the value of a successful field at `index`.
    #[must_use]
    pub fn content_at(&self, index: usize) -> Option<&Value> {
        self.get(index)
            .filter(|field| field.status == FieldStatus::Success)
            .and_then(FieldResult::value)
    }

    /// Returns `true` when the field at `index` succeeded.
    #[must_use]
    pub fn exists_at(&self, index: usize) -> bool {
        self.get(index).is_some_and(|field| field.status == FieldStatus::Success)
    }

    /// Iterates over the fields in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldResult> {
        self.fields.iter()
    }

    /// The number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the result and returns the fields.
    #[must_use]
    pub fn into_fields(self) -> Vec<FieldResult> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a MultiResult {
    type Item = &'a FieldResult;
    type IntoIter = std::slice::Iter<'a, FieldResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
