//! Typed errors for the metadata pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors raised by the extraction provider.
///
/// None of these are retried inside the pipeline; a base-stage provider
/// error triggers the fallback classifier instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout, or 5xx from the extraction service
    #[error("extraction service unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP response that is not an availability problem
    #[error("extraction request rejected: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The provider echoed the template schema instead of extracted values
    #[error("provider returned a template definition instead of extracted values")]
    TemplateEcho,

    /// Response body could not be decoded at all
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by the remote metadata store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Instance already exists for this file+template.
    ///
    /// Expected, not a failure: drives the create → update transition.
    #[error("metadata instance already exists")]
    Conflict,

    /// The store rejected a write (validation, bad field, etc.)
    #[error("store rejected write: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Template schema not held by the store
    #[error("template not found: {scope}/{template_key}")]
    TemplateNotFound { scope: String, template_key: String },

    /// Transport-level failure
    #[error("store request failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Whether this error is the expected already-exists signal.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

// Orchestration and batch operations have no error type: they return
// structured outcomes (`FileOutcome`, `BatchOutcome`) describing which
// fields and stages succeeded.
