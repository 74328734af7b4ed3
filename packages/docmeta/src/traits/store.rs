//! Metadata store trait - the remote content store seam.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// A single patch operation in a store update request.
///
/// The store's update endpoint takes a JSON Patch-style list; `add`
/// works for both new and existing fields, so the applier only ever
/// emits `add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    /// Operation name, always `add`
    pub op: String,

    /// JSON pointer to the field, e.g. `/documentType`
    pub path: String,

    /// Wire-formatted field value
    pub value: Value,
}

impl PatchOp {
    /// An `add` operation for a field key.
    pub fn add(key: &str, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: format!("/{key}"),
            value,
        }
    }

    /// The field key this operation targets.
    pub fn key(&self) -> &str {
        self.path.trim_start_matches('/')
    }
}

/// The remote metadata store, keyed per (file, scope, template).
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create a new metadata instance with the full field map.
    ///
    /// Returns [`StoreError::Conflict`] when an instance already exists;
    /// callers transition to [`MetadataStore::update_instance`].
    async fn create_instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
        fields: &IndexMap<String, Value>,
    ) -> Result<(), StoreError>;

    /// Patch an existing instance with a batched list of operations.
    async fn update_instance(
        &self,
        file_id: &str,
        scope: &str,
        template_key: &str,
        ops: &[PatchOp],
    ) -> Result<(), StoreError>;
}
