//! Metadata template types - the schemas the remote store enforces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared type of a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    String,
    /// Numeric amount (the store validates strictly)
    Float,
    /// Calendar date
    Date,
    /// One of a fixed set of literal options
    Enum,
}

/// A single field declaration within a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field key, unique within the template
    pub key: String,

    /// Declared type the sanitizer enforces
    pub field_type: FieldType,

    /// Allowed literal values; only populated for enum fields
    #[serde(default)]
    pub options: Vec<String>,
}

impl FieldDefinition {
    /// Declare a string field.
    pub fn string(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::String,
            options: Vec::new(),
        }
    }

    /// Declare a float field.
    pub fn float(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::Float,
            options: Vec::new(),
        }
    }

    /// Declare a date field.
    pub fn date(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::Date,
            options: Vec::new(),
        }
    }

    /// Declare an enum field with its allowed options.
    pub fn enumeration(
        key: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::Enum,
            options: options.into_iter().map(|o| o.into()).collect(),
        }
    }

    /// Check whether a literal value is one of this field's enum options.
    ///
    /// Comparison is case-sensitive; the store rejects near-misses.
    pub fn allows_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }
}

/// A metadata template: an ordered set of field definitions, identified
/// by `(scope, template_key)`.
///
/// Templates are owned by the remote store and immutable once fetched;
/// the orchestrator caches them by value for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTemplate {
    /// Enterprise scope, e.g. `enterprise_218068865`
    pub scope: String,

    /// Template key, e.g. `financialDocumentBase`
    pub template_key: String,

    /// Field definitions in declaration order
    fields: IndexMap<String, FieldDefinition>,
}

impl MetadataTemplate {
    /// Create an empty template.
    pub fn new(scope: impl Into<String>, template_key: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            template_key: template_key.into(),
            fields: IndexMap::new(),
        }
    }

    /// Add a field definition, preserving declaration order.
    pub fn with_field(mut self, definition: FieldDefinition) -> Self {
        self.fields.insert(definition.key.clone(), definition);
        self
    }

    /// Look up a field definition by key.
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    /// Whether the template declares a field with this key.
    pub fn declares(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate field definitions in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Keys of all float-typed fields, in declaration order.
    pub fn float_keys(&self) -> Vec<&str> {
        self.fields
            .values()
            .filter(|f| f.field_type == FieldType::Float)
            .map(|f| f.key.as_str())
            .collect()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the template declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_preserved() {
        let template = MetadataTemplate::new("enterprise_1", "t")
            .with_field(FieldDefinition::string("b"))
            .with_field(FieldDefinition::float("a"))
            .with_field(FieldDefinition::date("c"));

        let keys: Vec<_> = template.fields().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(template.float_keys(), vec!["a"]);
    }

    #[test]
    fn test_enum_options_case_sensitive() {
        let def = FieldDefinition::enumeration("status", ["Match", "Mismatch"]);
        assert!(def.allows_option("Match"));
        assert!(!def.allows_option("match"));
        assert!(!def.allows_option("Maybe"));
    }
}
