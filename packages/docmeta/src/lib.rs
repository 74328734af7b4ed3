//! Financial Document Metadata Pipeline
//!
//! Extracts structured metadata from financial documents through a
//! remote AI extraction service and persists it against the typed
//! templates of a remote enterprise content store.
//!
//! # Design Philosophy
//!
//! **"The schema is the source of truth, the provider is noise"**
//!
//! - One canonical field map, whatever shape the provider answers in
//! - Every field validated against its template before it is written
//! - Writes degrade field-by-field instead of failing whole
//! - Structured outcomes, never opaque pass/fail
//! - Stateless between invocations; durability lives in the store
//!
//! # Usage
//!
//! ```rust,ignore
//! use docmeta::{
//!     BatchConfig, BatchCoordinator, FileRef, HttpExtractor, HttpMetadataStore,
//!     Orchestrator, OrchestratorConfig, ProviderConfig, StoreConfig,
//! };
//!
//! let extractor = HttpExtractor::new(ProviderConfig::new(base_url, token))?;
//! let store = HttpMetadataStore::new(StoreConfig::new(base_url, token))?;
//! let registry = HttpMetadataStore::new(StoreConfig::new(base_url, token))?;
//!
//! let orchestrator = Orchestrator::new(
//!     extractor,
//!     store,
//!     registry,
//!     OrchestratorConfig::new("enterprise_218068865"),
//! );
//! let coordinator = BatchCoordinator::new(orchestrator, BatchConfig::new());
//!
//! let outcome = coordinator
//!     .run(vec![FileRef::new("1182034", "2023_W2_JohnDoe.pdf")])
//!     .await;
//! println!("{}/{} files succeeded", outcome.succeeded, outcome.total);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Extractor, MetadataStore,
//!   TemplateRegistry, DocumentClassifier)
//! - [`types`] - Domain types (templates, field values, outcomes)
//! - [`pipeline`] - Normalize → sanitize → apply, orchestration, batching
//! - [`classify`] - AI and filename-heuristic classification strategies
//! - [`clients`] - HTTP implementations of the remote seams
//! - [`security`] - API token handling
//! - [`testing`] - Mock implementations for testing

pub mod classify;
pub mod clients;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ProviderError, StoreError};
pub use security::ApiToken;
pub use traits::{DocumentClassifier, Extractor, MetadataStore, PatchOp, TemplateRegistry};
pub use types::{
    ApplicationOutcome, ApplyPhase, BatchConfig, BatchOutcome, CanonicalFieldMap,
    ClassificationSource, Disposition, DocumentClassification, DocumentType, FieldDefinition,
    FieldFailure, FieldRejection, FieldType, FieldValue, FileOutcome, FileRef, MetadataTemplate,
    OrchestratorConfig, PhaseOutcome, ProviderConfig, RejectReason, SanitizedMetadata, StoreConfig,
};

// Re-export pipeline components
pub use pipeline::{
    // Stage functions
    apply_metadata, compare_addresses, ensure_instance, idempotency_key, normalize,
    resolve_response, sanitize,
    // Coordination
    BatchCoordinator, Orchestrator,
    // Address comparison
    AddressComparison, AddressMatch, ComponentComparison, ReferenceAddress,
    // Normalizer union
    ProviderResponse,
    // Sanitizer report
    SanitizeReport,
    // Built-in templates
    builtin_template, StaticRegistry, BUILTIN_TEMPLATE_KEYS,
};

// Re-export classification strategies
pub use classify::{classify_filename, AiClassifier, FilenameHeuristicClassifier};

// Re-export HTTP clients
pub use clients::{HttpExtractor, HttpMetadataStore};

// Re-export testing utilities
pub use testing::{MockExtractor, MockExtractorCall, MockStore, MockStoreCall};
