//! Extractor trait - the AI extraction provider seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::types::template::MetadataTemplate;

/// The extraction provider.
///
/// Implementations wrap the remote AI service and handle the specifics
/// of request shapes and authentication. The returned payload is raw:
/// the provider answers in one of several incompatible shapes, and the
/// response normalizer is the only component that interprets them.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Schema-driven structured extraction for one file against one
    /// template.
    ///
    /// Returns the raw response payload; callers run it through
    /// [`resolve_response`](crate::pipeline::normalize::resolve_response).
    async fn extract_structured(
        &self,
        file_id: &str,
        template: &MetadataTemplate,
    ) -> Result<Value, ProviderError>;

    /// Prompt-driven free-text question about one file.
    ///
    /// Used for classification when schema-driven extraction is not
    /// applicable. Returns the answer text.
    async fn ask(&self, file_id: &str, prompt: &str) -> Result<String, ProviderError>;
}
