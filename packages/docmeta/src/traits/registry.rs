//! Template registry trait - where template schemas come from.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::template::MetadataTemplate;

/// Source of template schemas.
///
/// The remote store is the authoritative registry (it enforces the
/// schemas it hands out); `StaticRegistry` serves the built-in set for
/// tests and offline use. Templates are immutable once fetched, so
/// callers cache them by value per run.
#[async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Fetch a template schema by scope and key.
    async fn template(&self, scope: &str, template_key: &str)
        -> Result<MetadataTemplate, StoreError>;
}
