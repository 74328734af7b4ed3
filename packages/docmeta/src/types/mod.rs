//! Domain types for the metadata pipeline.

pub mod classification;
pub mod config;
pub mod fields;
pub mod file;
pub mod outcome;
pub mod template;

pub use classification::{ClassificationSource, DocumentClassification, DocumentType};
pub use config::{BatchConfig, OrchestratorConfig, ProviderConfig, StoreConfig};
pub use fields::{CanonicalFieldMap, FieldRejection, FieldValue, RejectReason, SanitizedMetadata};
pub use file::FileRef;
pub use outcome::{
    ApplicationOutcome, ApplyPhase, BatchOutcome, Disposition, FieldFailure, FileOutcome,
    PhaseOutcome,
};
pub use template::{FieldDefinition, FieldType, MetadataTemplate};
