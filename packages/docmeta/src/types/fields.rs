//! Field value types - canonical maps and sanitized metadata.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::Value;

/// Provider-shape-independent mapping from field key to raw value,
/// produced by the response normalizer before any schema validation.
pub type CanonicalFieldMap = IndexMap<String, Value>;

/// A single field value that has passed sanitization against its
/// declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Trimmed, non-empty text
    Text(String),
    /// Parsed numeric amount
    Number(f64),
    /// Parsed calendar date
    Date(NaiveDate),
    /// One of the field's declared enum options, verbatim
    Choice(String),
}

impl FieldValue {
    /// Render as a plain JSON value (dates as `YYYY-MM-DD`).
    pub fn as_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::json!(n),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Choice(s) => Value::String(s.clone()),
        }
    }

    /// Render as the wire value the store expects.
    ///
    /// The store's date type requires RFC 3339 timestamps, so dates
    /// become `YYYY-MM-DDT00:00:00Z`; everything else matches
    /// [`FieldValue::as_json`].
    pub fn wire_json(&self) -> Value {
        match self {
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%dT00:00:00Z").to_string()),
            other => other.as_json(),
        }
    }
}

/// Schema-conformant metadata for one file+template pair.
///
/// Invariants, maintained by the sanitizer:
/// - every key is declared by the owning template
/// - every value satisfies its field's type/enum constraint
/// - no null or empty-string values are present (dropped, not stored)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedMetadata {
    fields: IndexMap<String, FieldValue>,
}

impl SanitizedMetadata {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sanitized value.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a value as text, if it is text or an enum choice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) | Some(FieldValue::Choice(s)) => Some(s),
            _ => None,
        }
    }

    /// Whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields survived sanitization.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// The subset of fields whose keys appear in `keys`.
    pub fn subset(&self, keys: &[&str]) -> SanitizedMetadata {
        SanitizedMetadata {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// The subset of fields whose keys do NOT appear in `keys`.
    pub fn without(&self, keys: &[&str]) -> SanitizedMetadata {
        SanitizedMetadata {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Render as a canonical field map (dates as `YYYY-MM-DD`).
    ///
    /// Sanitizing the result against the same template yields an
    /// identical map.
    pub fn to_canonical(&self) -> CanonicalFieldMap {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.as_json()))
            .collect()
    }

    /// Render as the wire body for a store create request.
    pub fn to_wire(&self) -> IndexMap<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.wire_json()))
            .collect()
    }
}

impl FromIterator<(String, FieldValue)> for SanitizedMetadata {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Why the sanitizer dropped a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Key not declared by the owning template
    Undeclared,
    /// Null, or empty after trimming
    Empty,
    /// Array or object where a scalar was required
    NotScalar,
    /// Could not be parsed as a numeric literal
    NotNumeric,
    /// Matched none of the accepted date formats
    UnrecognizedDate,
    /// Not one of the field's declared enum options
    NotAnOption,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::Undeclared => "not declared by template",
            RejectReason::Empty => "null or empty",
            RejectReason::NotScalar => "not a scalar value",
            RejectReason::NotNumeric => "not a numeric literal",
            RejectReason::UnrecognizedDate => "unrecognized date format",
            RejectReason::NotAnOption => "not a declared enum option",
        };
        f.write_str(s)
    }
}

/// A field the sanitizer dropped, with the raw value and the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRejection {
    /// Field key as it appeared in the canonical map
    pub key: String,

    /// The raw value that was rejected
    pub raw: Value,

    /// Why it was dropped
    pub reason: RejectReason,
}
