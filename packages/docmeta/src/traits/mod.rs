//! Core trait abstractions.
//!
//! The pipeline talks to its collaborators exclusively through these
//! seams, so every stage can be driven by mocks in tests:
//! - [`Extractor`] - the remote AI extraction provider
//! - [`MetadataStore`] - the remote content store's metadata endpoints
//! - [`TemplateRegistry`] - source of template schemas
//! - [`DocumentClassifier`] - classification strategy

pub mod classifier;
pub mod extractor;
pub mod registry;
pub mod store;

pub use classifier::DocumentClassifier;
pub use extractor::Extractor;
pub use registry::TemplateRegistry;
pub use store::{MetadataStore, PatchOp};
