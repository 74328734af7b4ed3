//! The metadata pipeline - the core of the library.
//!
//! Stages, in data-flow order:
//! - [`normalize`] - reconcile provider response shapes into one
//!   canonical field map
//! - [`sanitize`] - convert and validate fields against their template
//! - [`apply`] - create-or-update writes with phased degradation
//! - [`address`] - address comparison against the address of record
//! - [`orchestrate`] - the per-file extraction cascade
//! - [`batch`] - bounded fan-out over many files
//! - [`templates`] - built-in template definitions

pub mod address;
pub mod apply;
pub mod batch;
pub mod normalize;
pub mod orchestrate;
pub mod sanitize;
pub mod templates;

pub use address::{
    compare_addresses, has_address_components, normalize_component, similarity,
    stamp_extraction_date, synthesize_full_address, AddressComparison, AddressMatch,
    ComponentComparison, ReferenceAddress,
};
pub use apply::{apply_metadata, ensure_instance, idempotency_key};
pub use batch::BatchCoordinator;
pub use normalize::{normalize, resolve_response, ProviderResponse, EXTRACTED_TEXT_KEY};
pub use orchestrate::Orchestrator;
pub use sanitize::{parse_date, sanitize, SanitizeReport};
pub use templates::{builtin_template, StaticRegistry, BUILTIN_TEMPLATE_KEYS};
